use async_trait::async_trait;
use tracing::Instrument;
use wellfin_core::{
    FinishReason, ModelCandidate, ModelReply, ProviderInfo, Result, TextModel, WellfinError,
};
use wellfin_gemini::{
    GeminiClient, GenerationConfig, GenerationResponse, HarmBlockThreshold, HarmCategory,
    SafetySetting,
};
use wellfin_telemetry::model_call_span;

const JSON_MIME_TYPE: &str = "application/json";

/// Generation parameters applied to every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: i32,
    /// Ask the model for `application/json` output.
    pub json_output: bool,
    pub safety_settings: Vec<SafetySetting>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            max_output_tokens: 1024,
            json_output: true,
            safety_settings: vec![
                SafetySetting::new(HarmCategory::HateSpeech, HarmBlockThreshold::BlockMediumAndAbove),
                SafetySetting::new(
                    HarmCategory::DangerousContent,
                    HarmBlockThreshold::BlockMediumAndAbove,
                ),
            ],
        }
    }
}

impl GenerationSettings {
    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            max_output_tokens: Some(self.max_output_tokens),
            response_mime_type: self.json_output.then(|| JSON_MIME_TYPE.to_string()),
            ..Default::default()
        }
    }
}

/// [`TextModel`] backed by Gemini on AI Studio or Vertex AI.
pub struct GeminiModel {
    client: GeminiClient,
    model_name: String,
    settings: GenerationSettings,
}

impl GeminiModel {
    pub fn new(client: GeminiClient) -> Self {
        let model_name = client.model().to_string();
        Self { client, model_name, settings: GenerationSettings::default() }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn convert_response(resp: &GenerationResponse) -> ModelReply {
        let candidates = resp
            .candidates
            .iter()
            .map(|c| ModelCandidate {
                text: c.text(),
                finish_reason: c.finish_reason.map(|fr| match fr {
                    wellfin_gemini::FinishReason::Stop => FinishReason::Stop,
                    wellfin_gemini::FinishReason::MaxTokens => FinishReason::MaxTokens,
                    wellfin_gemini::FinishReason::Safety => FinishReason::Safety,
                    wellfin_gemini::FinishReason::Recitation => FinishReason::Recitation,
                    _ => FinishReason::Other,
                }),
            })
            .collect();

        ModelReply {
            candidates,
            blocked_reason: resp.block_reason().map(|r| r.as_wire_str().to_string()),
        }
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl TextModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<ModelReply> {
        let span = model_call_span(&self.model_name, "generate_content");
        let response = self
            .client
            .generate_content()
            .with_user_message(prompt)
            .with_generation_config(self.settings.generation_config())
            .with_safety_settings(self.settings.safety_settings.clone())
            .execute()
            .instrument(span)
            .await
            .map_err(|e| WellfinError::Model(error_chain(&e)))?;

        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                model = %self.model_name,
                prompt_tokens = usage.prompt_token_count,
                total_tokens = usage.total_token_count,
                "model usage"
            );
        }

        Ok(Self::convert_response(&response))
    }

    fn provider_info(&self) -> ProviderInfo {
        let description = self.client.describe();
        ProviderInfo {
            provider: description.kind.to_string(),
            model: description.model,
            project: description.project,
            location: description.location,
            credentials: Some(description.credentials),
        }
    }
}
