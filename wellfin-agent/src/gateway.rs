//! One model call plus extraction of its JSON object.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use wellfin_core::{FinishReason, ProviderInfo, TextModel};

use crate::error::GatewayError;
use crate::extract::{ExtractError, extract_json_object};

const PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct ModelGateway {
    model: Arc<dyn TextModel>,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.model.provider_info()
    }

    /// Sends `prompt` and returns the first JSON object in the reply. Never retries.
    pub async fn invoke(&self, prompt: &str, operation: &str) -> Result<Map<String, Value>, GatewayError> {
        let started = Instant::now();
        tracing::info!(operation, model = self.model.name(), prompt_len = prompt.len(), "model call started");

        let reply = self.model.generate(prompt).await.map_err(|e| {
            tracing::error!(
                operation,
                model = self.model.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "model call failed"
            );
            GatewayError::ModelUnavailable(e.to_string())
        })?;

        if let Some(reason) = reply.blocked_reason.clone() {
            tracing::warn!(operation, reason = %reason, "prompt blocked by provider");
            return Err(GatewayError::ContentBlocked { reason });
        }

        let candidate = reply.first().ok_or_else(|| {
            tracing::warn!(operation, "model returned no candidates");
            GatewayError::EmptyResponse
        })?;

        if candidate.finish_reason == Some(FinishReason::Safety) {
            tracing::warn!(operation, "response stopped by safety filter");
            return Err(GatewayError::ContentBlocked { reason: FinishReason::Safety.as_str().to_string() });
        }

        let text = candidate.text.as_str();
        tracing::info!(
            operation,
            text_len = text.len(),
            finish_reason = candidate.finish_reason.map(FinishReason::as_str).unwrap_or("UNKNOWN"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            preview = %preview(text),
            "model response received"
        );

        extract_json_object(text)
            .map(|object| {
                tracing::debug!(operation, keys = ?object.keys().collect::<Vec<_>>(), "parsed model JSON");
                object
            })
            .map_err(|e| {
                tracing::error!(operation, preview = %preview(text), "could not extract JSON from model response");
                match e {
                    ExtractError::NotFound => GatewayError::MalformedOutput { operation: operation.to_string() },
                    ExtractError::Invalid(message) => {
                        GatewayError::InvalidJson { operation: operation.to_string(), message }
                    }
                }
            })
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
