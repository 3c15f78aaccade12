//! Shared pieces of the success responses.

use std::time::Instant;

use axum::extract::FromRequest;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use wellfin_core::round_hundredths;

use super::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`] with code `INVALID_REQUEST_BODY`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// RFC 3339 with milliseconds, UTC.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stamp {
    AnalyzedAt(String),
    OptimizedAt(String),
    GeneratedAt(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub model: String,
    /// Seconds, two decimals.
    pub execution_time: f64,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalized: Option<bool>,
}

impl Metadata {
    pub fn new(stamp: fn(String) -> Stamp, model: &str, started: Instant) -> Self {
        Self {
            stamp: stamp(timestamp()),
            model: model.to_string(),
            execution_time: round_hundredths(started.elapsed().as_secs_f64()),
            ai_powered: true,
            fallback_reason: None,
            personalized: None,
        }
    }

    /// `None` keeps the response marked as model-generated.
    pub fn with_fallback(mut self, reason: Option<&str>) -> Self {
        if let Some(reason) = reason {
            self.ai_powered = false;
            self.fallback_reason = Some(reason.to_string());
        }
        self
    }

    pub fn personalized(mut self) -> Self {
        self.personalized = Some(true);
        self
    }
}
