//! Core request/response primitives shared by the generation API.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// Content part. Only text is produced by this client; anything else the
/// API returns is kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
        /// Whether this is a thought summary (thinking models only)
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    Other(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into(), thought: None }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self { parts: Some(vec![Part::text(text)]), role: None }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Concatenates the non-thought text parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .flatten()
            .filter_map(|part| match part {
                Part::Text { text, thought } if thought != &Some(true) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
