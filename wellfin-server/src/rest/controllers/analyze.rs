use std::sync::Arc;
use std::time::Instant;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wellfin_agent::{AnalysisRequest, PlanningService, TaskAnalysis};
use wellfin_auth::ApiIdentity;
use wellfin_core::{ExecutionReport, PriorityInput};

use crate::rest::envelope::{ApiJson, Metadata, Stamp, timestamp};
use crate::rest::error::{ANALYSIS_FAILED, ApiError};

#[derive(Clone)]
pub struct AnalyzeController {
    planning: Arc<PlanningService>,
}

impl AnalyzeController {
    pub fn new(planning: Arc<PlanningService>) -> Self {
        Self { planning }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTaskBody {
    pub user_input: Option<String>,
    pub scheduled_date: Option<String>,
    /// A label or a 1–5 number; anything else is ignored.
    pub priority: Option<Value>,
}

impl AnalyzeTaskBody {
    fn into_request(self) -> Result<AnalysisRequest, ApiError> {
        let user_input = self
            .user_input
            .filter(|input| !input.trim().is_empty())
            .ok_or_else(|| ApiError::missing_field("userInput is required"))?;

        let priority = self
            .priority
            .and_then(|p| serde_json::from_value::<PriorityInput>(p).ok())
            .filter(|p| !p.is_blank());

        Ok(AnalysisRequest { user_input, scheduled_date: self.scheduled_date, priority })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTaskResponse {
    pub success: bool,
    pub analysis: TaskAnalysis,
    pub execution: ExecutionReport,
    pub metadata: Metadata,
    pub timestamp: String,
}

pub async fn analyze_task(
    State(controller): State<AnalyzeController>,
    Extension(identity): Extension<ApiIdentity>,
    ApiJson(body): ApiJson<AnalyzeTaskBody>,
) -> Result<Json<AnalyzeTaskResponse>, ApiError> {
    let started = Instant::now();
    let request = body.into_request()?;
    tracing::info!(user_id = %identity.user_id, input_length = request.user_input.chars().count(), "task analysis requested");

    let outcome = controller.planning.analyze_task(&request).await.map_err(|e| {
        tracing::error!(
            error = %e,
            execution_time = started.elapsed().as_secs_f64(),
            "task analysis failed"
        );
        ApiError::Provider { code: ANALYSIS_FAILED, message: e.to_string() }
    })?;

    tracing::info!(
        user_id = %identity.user_id,
        task_id = %outcome.task_id,
        actions = outcome.execution.actions.len(),
        "task analysis completed"
    );

    Ok(Json(AnalyzeTaskResponse {
        success: true,
        analysis: outcome.analysis,
        execution: outcome.execution,
        metadata: Metadata::new(Stamp::AnalyzedAt, controller.planning.model_name(), started),
        timestamp: timestamp(),
    }))
}
