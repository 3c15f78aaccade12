use std::sync::Arc;

use anyhow::{Context, Result, bail};
use wellfin_agent::PlanningService;
use wellfin_auth::ApiKeyGate;
use wellfin_core::{TextModel, Tuning};
use wellfin_gemini::{GeminiBuilder, TokenSource};
use wellfin_model::GeminiModel;
use wellfin_server::{
    Diagnostics, FcmMessenger, InMemoryNotificationStore, NotificationService, SecurityConfig,
    ServerConfig, create_app,
};

use crate::config::AppConfig;

/// AI Studio when an API key is configured, Vertex AI otherwise.
pub fn build_model(config: &AppConfig) -> Result<Arc<dyn TextModel>> {
    let builder = match (&config.gemini_api_key, &config.project_id) {
        (Some(key), _) => GeminiBuilder::new(key.clone()),
        (None, Some(project)) => GeminiBuilder::new_without_api_key()
            .with_token_source(TokenSource::from_environment().context("loading Google credentials")?)
            .with_google_cloud(project.clone(), config.location.clone()),
        (None, None) => bail!("GOOGLE_CLOUD_PROJECT is required unless GEMINI_API_KEY is set"),
    };
    let client = builder.with_model(config.model.clone()).build().context("building Gemini client")?;
    Ok(Arc::new(GeminiModel::new(client)))
}

/// Push delivery is only wired up when a Firebase project is known.
pub fn build_notifications(config: &AppConfig) -> Result<Option<Arc<NotificationService>>> {
    let Some(project) = &config.firebase_project_id else {
        tracing::info!("No Firebase project configured, push notification routes disabled");
        return Ok(None);
    };
    let tokens = TokenSource::from_environment().context("loading Firebase credentials")?;
    let messenger = FcmMessenger::new(reqwest::Client::new(), project.clone(), tokens)?;
    Ok(Some(Arc::new(NotificationService::new(
        Arc::new(messenger),
        Arc::new(InMemoryNotificationStore::new()),
    ))))
}

pub fn build_planning(config: &AppConfig, model: Arc<dyn TextModel>) -> PlanningService {
    PlanningService::new(model)
        .with_tuning(Tuning::default().with_utc_offset_minutes(config.utc_offset_minutes))
}

pub fn build_server_config(
    config: &AppConfig,
    planning: Arc<PlanningService>,
    notifications: Option<Arc<NotificationService>>,
) -> ServerConfig {
    let gate = ApiKeyGate::new().with_keys(config.api_keys.iter().cloned()).with_dev_key(config.is_production());

    let mut server = ServerConfig::new(planning, Arc::new(gate))
        .with_notifications_opt(notifications)
        .with_environment(config.environment.clone())
        .with_diagnostics(Diagnostics {
            project_id: config.project_id.clone(),
            location: Some(config.location.clone()),
            credentials_path: config.credentials_path.clone(),
        });
    if !config.allowed_origins.is_empty() {
        server = server.with_security(SecurityConfig::production(config.allowed_origins.clone()));
    }
    server
}

pub async fn run_serve(config: AppConfig) -> Result<()> {
    wellfin_telemetry::init_telemetry("wellfin-api", config.log_format);
    config.validate()?;

    let model = build_model(&config)?;
    let planning = Arc::new(build_planning(&config, model));
    let notifications = build_notifications(&config)?;
    let server = build_server_config(&config, planning, notifications);
    let keys = server.gate.key_count();
    let app = create_app(server);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;

    tracing::info!(
        address = %addr,
        environment = %config.environment,
        model = %config.model,
        api_keys = keys,
        "WellFin API listening"
    );
    println!("WellFin AI Agent API starting on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn run_check_model(config: AppConfig) -> Result<()> {
    wellfin_telemetry::init_telemetry("wellfin-cli", config.log_format);

    let model = build_model(&config)?;
    let report = build_planning(&config, model).test_connection().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        bail!("model connection failed: {}", report.error.unwrap_or_default());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| env.get(name).cloned()).unwrap()
    }

    #[test]
    fn studio_model_uses_configured_name() {
        let model = build_model(&config(&[("GEMINI_API_KEY", "g"), ("GEMINI_MODEL", "gemini-2.0-flash")]))
            .unwrap();
        assert!(model.name().contains("gemini-2.0-flash"));
    }

    #[test]
    fn model_requires_a_backend() {
        assert!(build_model(&config(&[])).is_err());
    }

    #[test]
    fn server_config_reflects_environment() {
        let config = config(&[
            ("GEMINI_API_KEY", "g"),
            ("ENVIRONMENT", "production"),
            ("WELLFIN_API_KEY", "prod-key"),
            ("ALLOWED_ORIGINS", "https://wellfin.app"),
            ("WELLFIN_UTC_OFFSET_MINUTES", "540"),
        ]);
        let model = build_model(&config).unwrap();
        let planning = Arc::new(build_planning(&config, model));
        assert_eq!(planning.tuning().utc_offset_minutes, 540);

        let server = build_server_config(&config, planning, None);
        assert!(server.is_production());
        assert_eq!(server.gate.key_count(), 1);
        assert_eq!(server.security.allowed_origins, vec!["https://wellfin.app"]);
        assert!(server.notifications.is_none());
    }

    #[test]
    fn development_gate_accepts_dev_key() {
        let config = config(&[("GEMINI_API_KEY", "g")]);
        let model = build_model(&config).unwrap();
        let server = build_server_config(&config, Arc::new(build_planning(&config, model)), None);
        assert!(server.gate.authenticate(Some(wellfin_auth::DEV_API_KEY)).is_ok());
    }
}
