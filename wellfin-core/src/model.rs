use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A text-in, text-out generative model.
///
/// Implementations own transport, authentication and generation settings;
/// callers only see the candidates the provider returned.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<ModelReply>;

    /// Describes where requests go, for diagnostics endpoints.
    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo { provider: "unknown".to_string(), model: self.name().to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReply {
    pub candidates: Vec<ModelCandidate>,
    /// Set when the provider refused the prompt itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![ModelCandidate { text: text.into(), finish_reason: Some(FinishReason::Stop) }],
            blocked_reason: None,
        }
    }

    pub fn first(&self) -> Option<&ModelCandidate> {
        self.candidates.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCandidate {
    pub text: String,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

impl FinishReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FinishReason::Stop => "STOP",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Safety => "SAFETY",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Other => "OTHER",
        }
    }
}

/// Where model calls are sent and how they authenticate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Human-readable credential source, never the secret itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}
