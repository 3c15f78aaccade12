use reqwest::header::InvalidHeaderValue;
use snafu::Snafu;
use url::Url;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to parse API key"))]
    InvalidApiKey {
        source: InvalidHeaderValue,
    },

    #[snafu(display("failed to construct URL (probably incorrect model name): {suffix}"))]
    ConstructUrl {
        source: url::ParseError,
        suffix: String,
    },

    #[snafu(display("failed to build HTTP client"))]
    BuildClient {
        source: reqwest::Error,
    },

    #[snafu(display("failed to perform request to '{url}'"))]
    PerformRequest {
        source: reqwest::Error,
        url: Url,
    },

    #[snafu(display(
        "bad response from server; code {code}; description: {}",
        description.as_deref().unwrap_or("none")
    ))]
    BadResponse {
        /// HTTP status code
        code: u16,
        /// HTTP error description
        description: Option<String>,
    },

    #[snafu(display("failed to decode response body"))]
    DecodeResponse {
        source: reqwest::Error,
    },

    #[snafu(display("failed to parse URL"))]
    UrlParse {
        source: url::ParseError,
    },

    #[snafu(display("failed to parse service account JSON"))]
    ServiceAccountKeyParse {
        source: serde_json::Error,
    },

    #[snafu(display("failed to sign service account JWT"))]
    ServiceAccountJwt {
        source: jsonwebtoken::errors::Error,
    },

    #[snafu(display("failed to request service account token from '{url}'"))]
    ServiceAccountToken {
        source: reqwest::Error,
        url: String,
    },

    #[snafu(display("failed to request access token from metadata server '{url}'"))]
    MetadataToken {
        source: reqwest::Error,
        url: String,
    },

    #[snafu(display("failed to read credentials file '{path}'"))]
    CredentialsFile {
        source: std::io::Error,
        path: String,
    },

    #[snafu(display("api key is required for this configuration"))]
    MissingApiKey,

    #[snafu(display("Configuration error: {message}"))]
    Configuration {
        message: String,
    },
}

impl Error {
    /// HTTP status reported by the provider, when the failure was a bad response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::BadResponse { code, .. } => Some(*code),
            _ => None,
        }
    }
}
