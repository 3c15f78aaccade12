use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use wellfin_core::{
    FinishReason, ModelCandidate, ModelReply, ProviderInfo, Result, TextModel, WellfinError,
};

#[derive(Debug, Clone)]
enum MockStep {
    Reply(ModelReply),
    Error(String),
}

/// Scripted [`TextModel`] for tests.
///
/// Steps are consumed in order; the last step repeats once the script runs out.
/// Every prompt is recorded.
pub struct MockModel {
    name: String,
    steps: Mutex<VecDeque<MockStep>>,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), steps: Mutex::new(VecDeque::new()), prompts: Mutex::new(Vec::new()) }
    }

    fn push(self, step: MockStep) -> Self {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
        self
    }

    /// A single candidate with the given text and `STOP`.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(MockStep::Reply(ModelReply::text(text)))
    }

    pub fn with_reply(self, reply: ModelReply) -> Self {
        self.push(MockStep::Reply(reply))
    }

    /// A provider failure (network, auth, quota).
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(MockStep::Error(message.into()))
    }

    /// A reply with zero candidates.
    pub fn with_empty_reply(self) -> Self {
        self.push(MockStep::Reply(ModelReply::default()))
    }

    /// A candidate stopped by the safety filter.
    pub fn with_safety_block(self) -> Self {
        self.push(MockStep::Reply(ModelReply {
            candidates: vec![ModelCandidate { text: String::new(), finish_reason: Some(FinishReason::Safety) }],
            blocked_reason: None,
        }))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    fn next_step(&self) -> Option<MockStep> {
        let mut steps = self.steps.lock().ok()?;
        if steps.len() > 1 { steps.pop_front() } else { steps.front().cloned() }
    }
}

#[async_trait]
impl TextModel for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<ModelReply> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match self.next_step() {
            Some(MockStep::Reply(reply)) => Ok(reply),
            Some(MockStep::Error(message)) => Err(WellfinError::Model(message)),
            None => Err(WellfinError::Model("mock model has no scripted response".to_string())),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "mock".to_string(),
            model: self.name.clone(),
            project: Some("test-project".to_string()),
            location: Some("test-location".to_string()),
            credentials: Some("none".to_string()),
        }
    }
}
