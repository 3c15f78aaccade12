use std::sync::Arc;

use crate::backend::{BackendDescription, GeminiBackend};
use crate::generation::ContentBuilder;

/// Gemini client over an AI Studio or Vertex AI backend.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    backend: Arc<dyn GeminiBackend>,
}

impl GeminiClient {
    pub fn with_backend(backend: Arc<dyn GeminiBackend>) -> Self {
        Self { backend }
    }

    /// Starts a `generateContent` request.
    pub fn generate_content(&self) -> ContentBuilder {
        ContentBuilder::new(self.backend.clone())
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub fn describe(&self) -> BackendDescription {
        self.backend.describe()
    }
}
