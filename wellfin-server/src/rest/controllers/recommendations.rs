use std::sync::Arc;
use std::time::Instant;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use wellfin_agent::{
    PlanningService, RecommendationAnalytics, RecommendationRequest, UserContext, UserProfile,
};
use wellfin_auth::ApiIdentity;
use wellfin_core::{ExecutionReport, RecommendationItem};

use crate::rest::envelope::{ApiJson, Metadata, Stamp, timestamp};
use crate::rest::error::ApiError;

#[derive(Clone)]
pub struct RecommendationsController {
    planning: Arc<PlanningService>,
}

impl RecommendationsController {
    pub fn new(planning: Arc<PlanningService>) -> Self {
        Self { planning }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsBody {
    pub user_profile: Option<UserProfile>,
    pub context: Option<UserContext>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: Vec<RecommendationItem>,
    pub execution: ExecutionReport,
    pub analytics: RecommendationAnalytics,
    pub personalized_tips: Vec<String>,
    pub next_actions: Vec<String>,
    pub metadata: Metadata,
    pub timestamp: String,
}

pub async fn recommendations(
    State(controller): State<RecommendationsController>,
    Extension(identity): Extension<ApiIdentity>,
    ApiJson(body): ApiJson<RecommendationsBody>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let started = Instant::now();
    if body.user_profile.is_none() && body.context.is_none() {
        return Err(ApiError::missing_field("Either userProfile or context is required"));
    }

    let request = RecommendationRequest::from_parts(
        identity.user_id.clone(),
        body.user_profile,
        body.context,
        controller.planning.tuning(),
    );
    let planned = controller.planning.generate_recommendations(&request).await;
    let metadata = Metadata::new(Stamp::GeneratedAt, controller.planning.model_name(), started)
        .with_fallback(planned.fallback_reason())
        .personalized();
    let outcome = planned.value;

    tracing::info!(
        user_id = %identity.user_id,
        ai_powered = metadata.ai_powered,
        count = outcome.recommendations.len(),
        "recommendations generated"
    );

    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations: outcome.recommendations,
        execution: outcome.execution,
        analytics: outcome.analytics,
        personalized_tips: outcome.personalized_tips,
        next_actions: outcome.next_actions,
        metadata,
        timestamp: timestamp(),
    }))
}
