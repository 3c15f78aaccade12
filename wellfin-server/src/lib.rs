//! # wellfin-server
//!
//! HTTP surface of the WellFin planning API: the axum router, its
//! controllers and the push-notification service.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wellfin_agent::PlanningService;
//! use wellfin_auth::ApiKeyGate;
//! use wellfin_model::MockModel;
//! use wellfin_server::{ServerConfig, create_app};
//!
//! # async fn run() -> std::io::Result<()> {
//! let planning = Arc::new(PlanningService::new(Arc::new(MockModel::new("mock"))));
//! let gate = Arc::new(ApiKeyGate::new().with_dev_key(false));
//! let app = create_app(ServerConfig::new(planning, gate));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod config;
pub mod push;
pub mod rest;

pub use config::{Diagnostics, SecurityConfig, ServerConfig, ServiceInfo};
pub use push::{FcmMessenger, InMemoryNotificationStore, Messenger, NotificationService, NotificationStore};
pub use rest::{ApiError, create_app};
