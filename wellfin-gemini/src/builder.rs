use reqwest::ClientBuilder;
use reqwest::header::{HeaderMap, HeaderValue};
use snafu::ResultExt;
use std::sync::Arc;
use url::Url;

use crate::auth::TokenSource;
use crate::backend::studio::{AuthConfig, DEFAULT_BASE_URL, StudioBackend};
use crate::backend::vertex::VertexBackend;
use crate::client::GeminiClient;
use crate::common::Model;
use crate::error::*;

enum AuthMode {
    ApiKey(String),
    Tokens(TokenSource),
    None,
}

struct VertexConfig {
    project_id: String,
    location: String,
    endpoint: Option<Url>,
}

/// A builder for [`GeminiClient`].
pub struct GeminiBuilder {
    model: Model,
    client_builder: ClientBuilder,
    base_url: Url,
    auth: AuthMode,
    vertex_config: Option<VertexConfig>,
}

impl GeminiBuilder {
    /// Creates a new `GeminiBuilder` with the given AI Studio API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            model: Model::default(),
            client_builder: ClientBuilder::default(),
            base_url: DEFAULT_BASE_URL.clone(),
            auth: AuthMode::ApiKey(key.into()),
            vertex_config: None,
        }
    }

    /// Creates a new `GeminiBuilder` without credentials; supply a token source later.
    pub fn new_without_api_key() -> Self {
        Self {
            model: Model::default(),
            client_builder: ClientBuilder::default(),
            base_url: DEFAULT_BASE_URL.clone(),
            auth: AuthMode::None,
            vertex_config: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets a custom `reqwest::ClientBuilder` (timeouts, proxies).
    pub fn with_http_client(mut self, client_builder: ClientBuilder) -> Self {
        self.client_builder = client_builder;
        self
    }

    /// Sets a custom base URL for the AI Studio API.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Authenticates with a service account JSON key.
    pub fn with_service_account_json(mut self, service_account_json: &str) -> Result<Self, Error> {
        self.auth = AuthMode::Tokens(TokenSource::from_service_account_json(service_account_json)?);
        Ok(self)
    }

    pub fn with_token_source(mut self, tokens: TokenSource) -> Self {
        self.auth = AuthMode::Tokens(tokens);
        self
    }

    /// Routes requests to Vertex AI in the given project and region.
    pub fn with_google_cloud(
        mut self,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.vertex_config = Some(VertexConfig {
            project_id: project_id.into(),
            location: location.into(),
            endpoint: None,
        });
        self
    }

    /// Overrides the regional Vertex endpoint. Requires `with_google_cloud`.
    pub fn with_vertex_endpoint(mut self, endpoint: Url) -> Self {
        if let Some(config) = self.vertex_config.as_mut() {
            config.endpoint = Some(endpoint);
        }
        self
    }

    pub fn build(self) -> Result<GeminiClient, Error> {
        if let Some(config) = self.vertex_config {
            let tokens = match self.auth {
                AuthMode::Tokens(tokens) => tokens,
                AuthMode::ApiKey(_) | AuthMode::None => {
                    return Err(Error::Configuration {
                        message: "Vertex AI requires OAuth credentials (service account or metadata server)"
                            .to_string(),
                    });
                }
            };

            let endpoint = match config.endpoint {
                Some(endpoint) => endpoint,
                None => VertexBackend::default_endpoint(&config.location)?,
            };
            let http_client = self.client_builder.build().context(BuildClientSnafu)?;
            let backend = VertexBackend::new(
                http_client,
                endpoint,
                config.project_id,
                config.location,
                self.model,
                tokens,
            );

            return Ok(GeminiClient::with_backend(Arc::new(backend)));
        }

        let auth_config = match self.auth {
            AuthMode::ApiKey(key) => AuthConfig::ApiKey(key),
            AuthMode::Tokens(tokens) => AuthConfig::Token(tokens),
            AuthMode::None => return Err(Error::MissingApiKey),
        };

        let mut headers = HeaderMap::new();
        if let AuthConfig::ApiKey(ref key) = auth_config {
            headers.insert("x-goog-api-key", HeaderValue::from_str(key).context(InvalidApiKeySnafu)?);
        }

        let http_client =
            self.client_builder.default_headers(headers).build().context(BuildClientSnafu)?;

        let backend =
            StudioBackend::new_with_client(http_client, self.base_url, self.model, auth_config);

        Ok(GeminiClient::with_backend(Arc::new(backend)))
    }
}
