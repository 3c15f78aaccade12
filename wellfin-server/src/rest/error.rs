use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

use super::envelope::timestamp;

pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";
pub const INVALID_TASK_FORMAT: &str = "INVALID_TASK_FORMAT";
pub const INVALID_REQUEST_BODY: &str = "INVALID_REQUEST_BODY";
pub const ANALYSIS_FAILED: &str = "ANALYSIS_FAILED";

/// Every error a handler can return.
///
/// Planning routes answer `{error, code, timestamp}`; notification routes
/// answer `{success: false, error, details?}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    Provider { code: &'static str, message: String },

    #[error("{message}")]
    Notification { status: StatusCode, message: String, details: Option<String> },
}

impl ApiError {
    pub fn missing_field(message: impl Into<String>) -> Self {
        ApiError::Validation { code: MISSING_REQUIRED_FIELD, message: message.into() }
    }

    pub fn invalid_task(message: impl Into<String>) -> Self {
        ApiError::Validation { code: INVALID_TASK_FORMAT, message: message.into() }
    }

    pub fn notification_invalid(message: impl Into<String>) -> Self {
        ApiError::Notification { status: StatusCode::BAD_REQUEST, message: message.into(), details: None }
    }

    pub fn notification_failed(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Notification {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Notification { status, .. } => *status,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Validation { code, message } | ApiError::Provider { code, message } => {
                json!({ "error": message, "code": code, "timestamp": timestamp() })
            }
            ApiError::Notification { message, details, .. } => {
                let mut body = json!({ "success": false, "error": message });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                body
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation { code: INVALID_REQUEST_BODY, message: rejection.body_text() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body() {
        let err = ApiError::missing_field("userInput is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body["error"], "userInput is required");
        assert_eq!(body["code"], MISSING_REQUIRED_FIELD);
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_notification_bodies() {
        let invalid = ApiError::notification_invalid("title, bodyは必須です").body();
        assert_eq!(invalid["success"], false);
        assert!(invalid.get("details").is_none());

        let failed = ApiError::notification_failed("プッシュ通知の送信に失敗しました", "quota");
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.body()["details"], "quota");
    }
}
