use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use wellfin_agent::{ConnectionReport, PlanningService};
use wellfin_core::ProviderInfo;

use crate::config::{Diagnostics, ServerConfig, ServiceInfo};
use crate::rest::envelope::timestamp;

const NOT_SET: &str = "NOT_SET";

const TROUBLESHOOTING: [&str; 4] = [
    "Check if Vertex AI API is enabled",
    "Verify service account has aiplatform.admin role",
    "Ensure Cloud Run Functions is using correct service account",
    "Check project ID configuration",
];

#[derive(Clone)]
pub struct SystemController {
    planning: Arc<PlanningService>,
    info: ServiceInfo,
    diagnostics: Diagnostics,
}

impl SystemController {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            planning: config.planning.clone(),
            info: config.info.clone(),
            diagnostics: config.diagnostics.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: String,
    pub environment: String,
    pub service: String,
}

pub async fn health(State(controller): State<SystemController>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp(),
        version: controller.info.version,
        environment: controller.info.environment,
        service: controller.info.name,
    })
}

pub async fn root(State(controller): State<SystemController>) -> Json<Value> {
    Json(json!({
        "message": controller.info.name,
        "version": controller.info.version,
        "endpoints": {
            "health": "/health",
            "testAI": "/test-ai",
            "analyzeTask": "/api/v1/analyze-task",
            "optimizeSchedule": "/api/v1/optimize-schedule",
            "recommendations": "/api/v1/recommendations",
            "vertexAITest": "/api/v1/vertex-ai-test",
            "pushNotifications": "/api/v1/push-notifications"
        },
        "features": {
            "executionResults": "エージェント実行結果をレスポンスに含む",
            "actionTracking": "実行されたアクションの詳細追跡",
            "performanceMetrics": "実行時間とパフォーマンス指標"
        }
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    #[serde(flatten)]
    pub report: ConnectionReport,
    pub timestamp: String,
    pub service: String,
}

/// Always 200; the probe outcome is in `success`.
pub async fn test_ai(State(controller): State<SystemController>) -> Json<ProbeResponse> {
    let report = controller.planning.test_connection().await;
    if !report.success {
        tracing::warn!(error = ?report.error, "model connection test failed");
    }
    Json(ProbeResponse { report, timestamp: timestamp(), service: controller.info.name })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexDiagnostics {
    pub timestamp: String,
    pub environment: Value,
    pub service_account: ProviderInfo,
    #[serde(rename = "vertexAITest")]
    pub vertex_ai_test: ConnectionReport,
    pub status: &'static str,
    pub recommendations: Vec<&'static str>,
}

/// 200 when the probe succeeds, 500 otherwise.
pub async fn vertex_ai_test(State(controller): State<SystemController>) -> (StatusCode, Json<VertexDiagnostics>) {
    let diagnostics = &controller.diagnostics;
    let environment = json!({
        "PROJECT_ID": diagnostics.project_id.as_deref().unwrap_or(NOT_SET),
        "VERTEX_AI_LOCATION": diagnostics.location.as_deref().unwrap_or(NOT_SET),
        "ENVIRONMENT": controller.info.environment,
        "HAS_GOOGLE_CREDENTIALS": diagnostics.credentials_path.is_some(),
        "GOOGLE_CREDENTIALS_PATH": diagnostics.credentials_path.as_deref().unwrap_or(NOT_SET),
    });

    let report = controller.planning.test_connection().await;
    let (status, recommendations) = if report.success {
        (StatusCode::OK, Vec::new())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, TROUBLESHOOTING.to_vec())
    };

    let body = VertexDiagnostics {
        timestamp: timestamp(),
        environment,
        service_account: controller.planning.provider_info(),
        status: if report.success { "SUCCESS" } else { "FAILED" },
        vertex_ai_test: report,
        recommendations,
    };
    (status, Json(body))
}
