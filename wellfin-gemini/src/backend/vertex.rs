use async_trait::async_trait;
use reqwest::Client;
use snafu::ResultExt;
use url::Url;

use crate::auth::{TokenSource, check_response};
use crate::backend::{BackendDescription, GeminiBackend};
use crate::common::Model;
use crate::error::{ConstructUrlSnafu, DecodeResponseSnafu, Error, UrlParseSnafu};
use crate::generation::{GenerateContentRequest, GenerationResponse};

/// Regional Vertex AI REST endpoint, authenticated with an OAuth bearer token.
#[derive(Debug)]
pub struct VertexBackend {
    http_client: Client,
    endpoint: Url,
    project_id: String,
    location: String,
    model: Model,
    tokens: TokenSource,
}

impl VertexBackend {
    pub fn new(
        http_client: Client,
        endpoint: Url,
        project_id: impl Into<String>,
        location: impl Into<String>,
        model: Model,
        tokens: TokenSource,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            project_id: project_id.into(),
            location: location.into(),
            model,
            tokens,
        }
    }

    /// `https://{location}-aiplatform.googleapis.com/`
    pub fn default_endpoint(location: &str) -> Result<Url, Error> {
        Url::parse(&format!("https://{location}-aiplatform.googleapis.com/")).context(UrlParseSnafu)
    }

    fn build_url(&self, method: &str) -> Result<Url, Error> {
        let suffix = format!(
            "v1/{}:{}",
            self.model.vertex_model_path(&self.project_id, &self.location),
            method
        );
        self.endpoint.join(&suffix).context(ConstructUrlSnafu { suffix })
    }
}

#[async_trait]
impl GeminiBackend for VertexBackend {
    fn model(&self) -> &str {
        self.model.id()
    }

    fn describe(&self) -> BackendDescription {
        BackendDescription {
            kind: "vertex-ai",
            model: self.model.id().to_string(),
            project: Some(self.project_id.clone()),
            location: Some(self.location.clone()),
            credentials: self.tokens.describe(),
        }
    }

    async fn generate_content(
        &self,
        req: GenerateContentRequest,
    ) -> Result<GenerationResponse, Error> {
        let url = self.build_url("generateContent")?;
        let token = self.tokens.access_token(&self.http_client).await?;

        tracing::debug!(url = %url, "sending vertex generateContent request");
        let response = self
            .http_client
            .post(url.clone())
            .bearer_auth(token)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::PerformRequest { source: e, url })?;
        let response = check_response(response).await?;
        response.json().await.context(DecodeResponseSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_url() {
        let backend = VertexBackend::new(
            Client::new(),
            VertexBackend::default_endpoint("asia-northeast1").unwrap(),
            "wellfin-72698",
            "asia-northeast1",
            Model::Gemini15Flash,
            TokenSource::Static("t".into()),
        );
        assert_eq!(
            backend.build_url("generateContent").unwrap().as_str(),
            "https://asia-northeast1-aiplatform.googleapis.com/v1/projects/wellfin-72698/locations/asia-northeast1/publishers/google/models/gemini-1.5-flash:generateContent"
        );

        let description = backend.describe();
        assert_eq!(description.kind, "vertex-ai");
        assert_eq!(description.project.as_deref(), Some("wellfin-72698"));
        assert_eq!(description.credentials, "static access token");
    }
}
