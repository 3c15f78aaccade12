use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use wellfin_core::{ProviderInfo, TextModel, Tuning};

use crate::analysis::{AnalysisOutcome, AnalysisRequest, normalize_analysis};
use crate::error::{AgentError, Result};
use crate::fallback::{fallback_recommendations, fallback_schedule};
use crate::gateway::ModelGateway;
use crate::prompt::{
    connection_test_prompt, recommendations_prompt, schedule_optimization_prompt,
    task_analysis_prompt,
};
use crate::recommendations::{
    ModelRecommendations, RecommendationOutcome, RecommendationRequest, normalize_recommendations,
    summarize_recommendations,
};
use crate::schedule::{
    ModelSchedule, ScheduleOutcome, ScheduleRequest, reconcile_schedule, summarize_schedule,
};

const TASK_ANALYSIS: &str = "task analysis";
const SCHEDULE_OPTIMIZATION: &str = "schedule optimization";
const RECOMMENDATIONS: &str = "recommendations generation";
const CONNECTION_TEST: &str = "connection test";

/// Where a result came from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    Model,
    Fallback { reason: String },
}

/// A result that is always available, possibly from the fallback engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Planned<T> {
    pub value: T,
    pub source: PlanSource,
}

impl<T> Planned<T> {
    pub fn ai_powered(&self) -> bool {
        self.source == PlanSource::Model
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.source {
            PlanSource::Model => None,
            PlanSource::Fallback { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    pub provider: String,
    pub project: Option<String>,
    pub location: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the three planning operations end to end: prompt, gateway,
/// normalization, and the fallback where one exists.
#[derive(Clone)]
pub struct PlanningService {
    gateway: ModelGateway,
    tuning: Tuning,
}

impl PlanningService {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { gateway: ModelGateway::new(model), tuning: Tuning::default() }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.gateway.provider_info()
    }

    /// Provider errors are returned to the caller; there is no fallback analysis.
    #[instrument(skip_all, fields(operation = TASK_ANALYSIS))]
    pub async fn analyze_task(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        let prompt = task_analysis_prompt(request);
        let raw = self.gateway.invoke(&prompt, TASK_ANALYSIS).await?;
        let outcome = normalize_analysis(&raw, request, self.model_name(), &self.tuning)?;
        tracing::info!(
            task_id = %outcome.task_id,
            priority = %outcome.analysis.priority,
            estimated_duration = outcome.analysis.estimated_duration,
            "task analysis completed"
        );
        Ok(outcome)
    }

    #[instrument(skip_all, fields(operation = SCHEDULE_OPTIMIZATION, tasks = request.tasks.len()))]
    pub async fn optimize_schedule(&self, request: &ScheduleRequest) -> Planned<ScheduleOutcome> {
        match self.model_schedule(request).await {
            Ok(model) => Planned {
                value: summarize_schedule(
                    model.schedule,
                    model.insights,
                    request,
                    Some(self.model_name()),
                    &self.tuning,
                ),
                source: PlanSource::Model,
            },
            Err(e) => {
                tracing::warn!(error = %e, "schedule optimization using rule-based fallback");
                let schedule = fallback_schedule(request, &self.tuning);
                Planned {
                    value: summarize_schedule(schedule, Vec::new(), request, None, &self.tuning),
                    source: fallback_source(&e),
                }
            }
        }
    }

    #[instrument(skip_all, fields(operation = RECOMMENDATIONS, user_id = %request.user_id))]
    pub async fn generate_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Planned<RecommendationOutcome> {
        match self.model_recommendations(request).await {
            Ok(model) => Planned {
                value: summarize_recommendations(model, request, Some(self.model_name()), &self.tuning),
                source: PlanSource::Model,
            },
            Err(e) => {
                tracing::warn!(error = %e, "recommendations using fixed fallback");
                let model = ModelRecommendations {
                    items: fallback_recommendations(&self.tuning),
                    ..Default::default()
                };
                Planned {
                    value: summarize_recommendations(model, request, None, &self.tuning),
                    source: fallback_source(&e),
                }
            }
        }
    }

    async fn model_schedule(&self, request: &ScheduleRequest) -> Result<ModelSchedule> {
        let prompt = schedule_optimization_prompt(request, &self.tuning);
        let raw = self.gateway.invoke(&prompt, SCHEDULE_OPTIMIZATION).await?;
        Ok(reconcile_schedule(&raw, request, &self.tuning)?)
    }

    async fn model_recommendations(&self, request: &RecommendationRequest) -> Result<ModelRecommendations> {
        let prompt = recommendations_prompt(request);
        let raw = self.gateway.invoke(&prompt, RECOMMENDATIONS).await?;
        Ok(normalize_recommendations(&raw, &self.tuning)?)
    }

    /// Round-trips a trivial prompt through the model.
    #[instrument(skip_all, fields(operation = CONNECTION_TEST))]
    pub async fn test_connection(&self) -> ConnectionReport {
        let info = self.gateway.provider_info();
        let prompt = connection_test_prompt(Utc::now());
        let (result, error) = match self.gateway.invoke(&prompt, CONNECTION_TEST).await {
            Ok(object) => (Some(Value::Object(object)), None),
            Err(e) => (None, Some(e.to_string())),
        };

        ConnectionReport {
            success: error.is_none(),
            provider: info.provider,
            project: info.project,
            location: info.location,
            model: info.model,
            result,
            error,
        }
    }
}

fn fallback_source(error: &AgentError) -> PlanSource {
    PlanSource::Fallback { reason: error.to_string() }
}
