use anyhow::{Result, bail};
use wellfin_telemetry::LogFormat;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_LOCATION: &str = "asia-northeast1";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Process configuration read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub project_id: Option<String>,
    pub location: String,
    pub credentials_path: Option<String>,
    /// When set, the model is reached through AI Studio instead of Vertex AI.
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub api_keys: Vec<String>,
    pub firebase_project_id: Option<String>,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| anyhow::anyhow!("PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };
        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => LogFormat::default(),
        };
        let utc_offset_minutes = match var("WELLFIN_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("WELLFIN_UTC_OFFSET_MINUTES must be an integer, got '{raw}'"))?,
            None => 0,
        };

        let mut api_keys = Vec::new();
        for name in ["WELLFIN_API_KEY", "DEV_TOKEN", "API_KEY"] {
            if let Some(key) = var(name) {
                if !api_keys.contains(&key) {
                    api_keys.push(key);
                }
            }
        }

        let project_id = var("GOOGLE_CLOUD_PROJECT");
        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',').map(str::trim).filter(|o| !o.is_empty()).map(str::to_string).collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            firebase_project_id: var("FIREBASE_PROJECT_ID").or_else(|| project_id.clone()),
            project_id,
            location: var("VERTEX_AI_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS"),
            gemini_api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_keys,
            allowed_origins,
            log_format,
            utc_offset_minutes,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Checks the combinations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.is_none() && self.project_id.is_none() {
            bail!("GOOGLE_CLOUD_PROJECT is required unless GEMINI_API_KEY is set");
        }
        if self.is_production() && self.api_keys.is_empty() {
            bail!("production requires WELLFIN_API_KEY (or DEV_TOKEN / API_KEY)");
        }
        Ok(())
    }
}
