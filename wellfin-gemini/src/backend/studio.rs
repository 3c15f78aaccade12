use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use std::sync::LazyLock;
use url::Url;

use crate::auth::{TokenSource, check_response};
use crate::backend::{BackendDescription, GeminiBackend};
use crate::common::Model;
use crate::error::{ConstructUrlSnafu, DecodeResponseSnafu, Error};
use crate::generation::{GenerateContentRequest, GenerationResponse};

pub(crate) static DEFAULT_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("unreachable error: failed to parse default base URL")
});

#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Sent as the `x-goog-api-key` default header of the HTTP client.
    ApiKey(String),
    Token(TokenSource),
}

/// Google AI Studio (`generativelanguage.googleapis.com`).
#[derive(Debug)]
pub struct StudioBackend {
    pub http_client: Client,
    pub base_url: Url,
    pub model: Model,
    pub auth: AuthConfig,
}

impl StudioBackend {
    pub fn new_with_client(
        http_client: Client,
        base_url: Url,
        model: Model,
        auth: AuthConfig,
    ) -> Self {
        Self { http_client, base_url, model, auth }
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        let mut request = self.http_client.post(url.clone()).json(body);
        if let AuthConfig::Token(tokens) = &self.auth {
            let token = tokens.access_token(&self.http_client).await?;
            request = request.bearer_auth(token);
        }

        let response: Response =
            request.send().await.map_err(|e| Error::PerformRequest { source: e, url })?;
        let response = check_response(response).await?;
        response.json().await.context(DecodeResponseSnafu)
    }

    fn build_url(&self, endpoint: &str) -> Result<Url, Error> {
        let suffix = format!("models/{}:{}", self.model.id(), endpoint);
        self.base_url.join(&suffix).context(ConstructUrlSnafu { suffix })
    }
}

#[async_trait]
impl GeminiBackend for StudioBackend {
    fn model(&self) -> &str {
        self.model.id()
    }

    fn describe(&self) -> BackendDescription {
        let credentials = match &self.auth {
            AuthConfig::ApiKey(_) => "api key".to_string(),
            AuthConfig::Token(tokens) => tokens.describe(),
        };
        BackendDescription {
            kind: "ai-studio",
            model: self.model.id().to_string(),
            project: None,
            location: None,
            credentials,
        }
    }

    async fn generate_content(
        &self,
        req: GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        self.post_json(url, &req).await
    }
}
