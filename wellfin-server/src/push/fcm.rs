use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;
use wellfin_core::{Result, WellfinError};
use wellfin_gemini::{FIREBASE_MESSAGING_SCOPE, TokenSource};

use super::message::PushMessage;
use super::messenger::Messenger;

const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/";

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

/// Firebase Cloud Messaging over the HTTP v1 API.
#[derive(Debug, Clone)]
pub struct FcmMessenger {
    http: Client,
    project_id: String,
    endpoint: Url,
    tokens: TokenSource,
}

impl FcmMessenger {
    /// The token source is narrowed to the messaging scope.
    pub fn new(http: Client, project_id: impl Into<String>, tokens: TokenSource) -> Result<Self> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).map_err(|e| WellfinError::Config(e.to_string()))?;
        Ok(Self {
            http,
            project_id: project_id.into(),
            endpoint,
            tokens: tokens.with_scopes(&[FIREBASE_MESSAGING_SCOPE]),
        })
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn send_url(&self) -> Result<Url> {
        self.endpoint
            .join(&format!("v1/projects/{}/messages:send", self.project_id))
            .map_err(|e| WellfinError::Config(format!("invalid messaging endpoint: {e}")))
    }
}

#[async_trait]
impl Messenger for FcmMessenger {
    async fn send(&self, message: &PushMessage) -> Result<String> {
        let token = self
            .tokens
            .access_token(&self.http)
            .await
            .map_err(|e| WellfinError::Notification(format!("messaging credentials: {e}")))?;

        let response = self
            .http
            .post(self.send_url()?)
            .bearer_auth(token)
            .json(&json!({ "message": message.to_fcm() }))
            .send()
            .await
            .map_err(|e| WellfinError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), target = %message.target.as_str(), "fcm send rejected");
            return Err(WellfinError::Notification(format!("FCM returned {}: {}", status.as_u16(), body)));
        }

        let sent: SendResponse =
            response.json().await.map_err(|e| WellfinError::Notification(e.to_string()))?;
        Ok(sent.name)
    }
}
