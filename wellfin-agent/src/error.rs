use thiserror::Error;

/// Failure of one gateway operation: the model call or reading its output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model returned no candidates")]
    EmptyResponse,

    #[error("content blocked by safety filters ({reason})")]
    ContentBlocked { reason: String },

    #[error("no JSON object found in model response for {operation}")]
    MalformedOutput { operation: String },

    #[error("invalid JSON in model response for {operation}: {message}")]
    InvalidJson { operation: String, message: String },
}

/// The model answered with JSON, but not the JSON an operation needs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Invalid task analysis result: missing required fields")]
    IncompleteAnalysis,

    #[error("Invalid {operation} result: missing {field} array")]
    MissingArray { operation: &'static str, field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
