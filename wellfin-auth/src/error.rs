use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("API key required")]
    MissingKey,

    #[error("Invalid API key")]
    InvalidKey,
}

impl AuthError {
    pub fn detail(self) -> &'static str {
        match self {
            AuthError::MissingKey => "Please provide X-API-Key header",
            AuthError::InvalidKey => "The provided API key is not valid",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string(), "message": self.detail() });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
