use async_trait::async_trait;
use wellfin_core::Result;

use super::message::PushMessage;

/// A push-notification transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends one message and returns the provider's message id.
    async fn send(&self, message: &PushMessage) -> Result<String>;

    /// Sends every message independently; results keep the input order.
    async fn send_each(&self, messages: &[PushMessage]) -> Vec<Result<String>> {
        futures::future::join_all(messages.iter().map(|m| self.send(m))).await
    }
}
