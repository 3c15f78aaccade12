use std::{sync::Arc, time::Duration};

use wellfin_agent::PlanningService;
use wellfin_auth::ApiKeyGate;

use crate::push::NotificationService;

/// Security configuration for the HTTP server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,
    /// Server-side request deadline. `None` leaves timing to the clients.
    pub request_timeout: Option<Duration>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: None,
        }
    }
}

impl SecurityConfig {
    /// Only the given origins may call the API.
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// What `/health` and `/` report about the running service.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "WellFin AI Agent API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Deployment facts echoed by the Vertex AI diagnostic endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub credentials_path: Option<String>,
}

/// Configuration for the HTTP server.
#[derive(Clone)]
pub struct ServerConfig {
    pub planning: Arc<PlanningService>,
    pub gate: Arc<ApiKeyGate>,
    /// Push routes are mounted only when this is set.
    pub notifications: Option<Arc<NotificationService>>,
    pub info: ServiceInfo,
    pub diagnostics: Diagnostics,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(planning: Arc<PlanningService>, gate: Arc<ApiKeyGate>) -> Self {
        Self {
            planning,
            gate,
            notifications: None,
            info: ServiceInfo::default(),
            diagnostics: Diagnostics::default(),
            security: SecurityConfig::default(),
        }
    }

    pub fn with_notifications(mut self, notifications: Arc<NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_notifications_opt(mut self, notifications: Option<Arc<NotificationService>>) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.info.environment = environment.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// Configure allowed CORS origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = Some(timeout);
        self
    }

    pub fn is_production(&self) -> bool {
        self.info.environment == "production"
    }
}
