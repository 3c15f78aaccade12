use std::sync::Arc;

use tracing::instrument;

use crate::backend::GeminiBackend;
use crate::error::Error;
use crate::generation::model::{GenerateContentRequest, GenerationConfig, GenerationResponse};
use crate::safety::SafetySetting;
use crate::types::{Content, Role};

/// Builder for a single `generateContent` call.
#[derive(Debug)]
pub struct ContentBuilder {
    backend: Arc<dyn GeminiBackend>,
    request: GenerateContentRequest,
}

impl ContentBuilder {
    pub(crate) fn new(backend: Arc<dyn GeminiBackend>) -> Self {
        Self { backend, request: GenerateContentRequest::default() }
    }

    pub fn with_user_message(mut self, text: impl Into<String>) -> Self {
        self.request.contents.push(Content::text(text).with_role(Role::User));
        self
    }

    pub fn with_system_prompt(mut self, text: impl Into<String>) -> Self {
        self.request.system_instruction = Some(Content::text(text));
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.request.generation_config = Some(config);
        self
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.request.safety_settings = Some(settings);
        self
    }

    pub fn build(self) -> GenerateContentRequest {
        self.request
    }

    #[instrument(skip_all, fields(
        model = self.backend.model(),
        messages.parts.count = self.request.contents.len(),
    ))]
    pub async fn execute(self) -> Result<GenerationResponse, Error> {
        self.backend.generate_content(self.request).await
    }
}
