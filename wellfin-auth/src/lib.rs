//! # wellfin-auth
//!
//! Shared-secret authentication for the WellFin API.
//!
//! ```rust
//! use std::sync::Arc;
//! use axum::{Router, middleware, routing::get};
//! use wellfin_auth::{ApiKeyGate, require_api_key};
//!
//! let gate = Arc::new(ApiKeyGate::new().with_key("my-key").with_dev_key(false));
//! let app: Router = Router::new()
//!     .route("/api/v1/ping", get(|| async { "pong" }))
//!     .layer(middleware::from_fn_with_state(gate, require_api_key));
//! ```

mod error;
mod gate;
mod middleware;

pub use error::AuthError;
pub use gate::{API_KEY_HEADER, ApiIdentity, ApiKeyGate, DEFAULT_EXEMPT_PATHS, DEV_API_KEY};
pub use middleware::require_api_key;
