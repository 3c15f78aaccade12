use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// Gemini models the planning service is known to work with.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Model {
    /// Low-latency model available in `asia-northeast1`.
    #[default]
    #[serde(rename = "models/gemini-1.5-flash")]
    Gemini15Flash,
    #[serde(rename = "models/gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "models/gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "models/gemini-2.5-pro")]
    Gemini25Pro,
    /// Any other model id or fully qualified resource path.
    #[serde(untagged)]
    Custom(String),
}

impl Model {
    /// Returns the API model identifier (e.g., "models/gemini-1.5-flash").
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini15Flash => "models/gemini-1.5-flash",
            Model::Gemini20Flash => "models/gemini-2.0-flash",
            Model::Gemini25Flash => "models/gemini-2.5-flash",
            Model::Gemini25Pro => "models/gemini-2.5-pro",
            Model::Custom(model) => model,
        }
    }

    /// The bare model id without the `models/` prefix.
    pub fn id(&self) -> &str {
        let full = self.as_str();
        full.strip_prefix("models/").unwrap_or(full)
    }

    /// Constructs the fully qualified Vertex AI resource path.
    pub fn vertex_model_path(&self, project_id: &str, location: &str) -> String {
        if let Model::Custom(custom) = self {
            if custom.starts_with("projects/") {
                return custom.clone();
            }
            if custom.starts_with("publishers/") {
                return format!("projects/{project_id}/locations/{location}/{custom}");
            }
        }

        format!("projects/{project_id}/locations/{location}/publishers/google/models/{}", self.id())
    }
}

impl AsRef<str> for Model {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        let id = s.strip_prefix("models/").unwrap_or(&s);
        match id {
            "gemini-1.5-flash" => Model::Gemini15Flash,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            _ => Model::Custom(s),
        }
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::from(s.to_string())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}
