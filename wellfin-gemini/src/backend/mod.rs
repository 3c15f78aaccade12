//! Backend abstraction for Gemini API providers.
//!
//! [`GeminiBackend`] hides whether requests go to AI Studio (API key) or to a
//! regional Vertex AI endpoint (OAuth bearer token). Both speak the same
//! `generateContent` JSON.

pub mod studio;
pub mod vertex;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Error;
use crate::generation::{GenerateContentRequest, GenerationResponse};

#[async_trait]
pub trait GeminiBackend: Send + Sync + std::fmt::Debug {
    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    fn describe(&self) -> BackendDescription;

    /// Generate content (non-streaming).
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerationResponse, Error>;
}

/// Diagnostic view of a backend's routing and credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendDescription {
    pub kind: &'static str,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub credentials: String,
}
