//! Notification use cases on top of a [`Messenger`] and a [`NotificationStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;
use wellfin_core::WellfinError;
use wellfin_telemetry::notification_send_span;

use super::message::{
    AI_REPORTS_CHANNEL, Delivery, HABIT_REMINDERS_CHANNEL, NotificationPriority, PushMessage,
    PushTarget, TASK_DEADLINES_CHANNEL,
};
use super::messenger::Messenger;
use super::store::{
    DeliveryStatus, DeviceRegistration, HistoryPage, NotificationKind, NotificationRecord,
    NotificationStore,
};

const UNKNOWN_PLATFORM: &str = "unknown";
const DEFAULT_TASK_PRIORITY: &str = "medium";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("user {0} not found")]
    UnknownUser(String),

    #[error("user {0} has no registered device token")]
    MissingToken(String),

    #[error(transparent)]
    Delivery(#[from] WellfinError),
}

/// Outcome of one recipient in a multicast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub token: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<RecipientResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HabitReminder {
    pub user_id: String,
    pub habit_name: String,
    pub reminder_time: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDeadline {
    pub user_id: String,
    pub task_name: String,
    pub due_date: String,
    pub priority: Option<String>,
    pub before_minutes: Option<u32>,
}

impl TaskDeadline {
    fn is_urgent(&self) -> bool {
        self.priority.as_deref() == Some("high")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiReport {
    pub user_id: String,
    pub report_type: String,
    pub summary: String,
    pub report_data: Option<Value>,
}

/// `90` → `1時間30分`; an hour or less stays in minutes.
pub fn lead_time_text(minutes: u32) -> String {
    if minutes > 60 { format!("{}時間{}分", minutes / 60, minutes % 60) } else { format!("{minutes}分") }
}

pub struct NotificationService {
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(messenger: Arc<dyn Messenger>, store: Arc<dyn NotificationStore>) -> Self {
        Self { messenger, store }
    }

    /// Sends to one device token.
    pub async fn send_to_token(&self, message: PushMessage) -> Result<String, NotifyError> {
        let owner = match &message.target {
            PushTarget::Token(token) => self.store.owner_of(token).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "device owner lookup failed");
                None
            }),
            PushTarget::Topic(_) => None,
        };
        Ok(self.deliver(&message, NotificationKind::Direct, owner).await?)
    }

    pub async fn send_to_topic(&self, message: PushMessage) -> Result<String, NotifyError> {
        Ok(self.deliver(&message, NotificationKind::Topic, None).await?)
    }

    /// Sends `template` to every token; individual failures do not fail the batch.
    pub async fn send_multiple(&self, tokens: &[String], template: &PushMessage) -> MulticastReport {
        let messages: Vec<PushMessage> =
            tokens.iter().map(|t| template.retarget(PushTarget::Token(t.clone()))).collect();

        let span = notification_send_span(NotificationKind::Multicast.as_str(), messages.len());
        let outcomes = self.messenger.send_each(&messages).instrument(span).await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (message, outcome) in messages.iter().zip(outcomes) {
            let owner = self.store.owner_of(message.target.as_str()).await.ok().flatten();
            self.record_attempt(message, NotificationKind::Multicast, owner, &outcome).await;
            results.push(match outcome {
                Ok(id) => RecipientResult {
                    token: message.target.as_str().to_string(),
                    success: true,
                    message_id: Some(id),
                    error: None,
                },
                Err(e) => RecipientResult {
                    token: message.target.as_str().to_string(),
                    success: false,
                    message_id: None,
                    error: Some(e.to_string()),
                },
            });
        }

        let success_count = results.iter().filter(|r| r.success).count();
        tracing::info!(success_count, failure_count = results.len() - success_count, "multicast finished");
        MulticastReport { success_count, failure_count: results.len() - success_count, results }
    }

    /// Unlike the other user-targeted sends, an unregistered user is reported as unknown.
    pub async fn habit_reminder(&self, reminder: &HabitReminder) -> Result<String, NotifyError> {
        let device = self
            .store
            .device(&reminder.user_id)
            .await?
            .ok_or_else(|| NotifyError::UnknownUser(reminder.user_id.clone()))?;
        let token = usable_token(&device).ok_or_else(|| NotifyError::MissingToken(reminder.user_id.clone()))?;

        let body = reminder
            .custom_message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("{}の時間です！今日も継続しましょう", reminder.habit_name));

        let message = PushMessage::new(PushTarget::Token(token), "🌟 習慣リマインダー", body)
            .with_entry("type", NotificationKind::HabitReminder.as_str())
            .with_entry("habitName", reminder.habit_name.clone())
            .with_entry("userId", reminder.user_id.clone())
            .with_entry("reminderTime", reminder.reminder_time.clone().unwrap_or_default())
            .with_delivery(Delivery::on_channel(HABIT_REMINDERS_CHANNEL, NotificationPriority::High));

        Ok(self.deliver(&message, NotificationKind::HabitReminder, Some(reminder.user_id.clone())).await?)
    }

    pub async fn task_deadline(&self, deadline: &TaskDeadline) -> Result<String, NotifyError> {
        let token = self.require_token(&deadline.user_id).await?;
        let minutes = deadline.before_minutes.unwrap_or(0);

        let (title, priority) = if deadline.is_urgent() {
            ("🚨 緊急タスク締切", NotificationPriority::Max)
        } else {
            ("⏰ タスク締切アラート", NotificationPriority::High)
        };
        let body = format!("「{}」の締切まで{}です", deadline.task_name, lead_time_text(minutes));

        let message = PushMessage::new(PushTarget::Token(token), title, body)
            .with_entry("type", "task_deadline")
            .with_entry("taskName", deadline.task_name.clone())
            .with_entry("userId", deadline.user_id.clone())
            .with_entry("dueDate", deadline.due_date.clone())
            .with_entry("priority", deadline.priority.clone().unwrap_or_else(|| DEFAULT_TASK_PRIORITY.to_string()))
            .with_entry("beforeMinutes", minutes.to_string())
            .with_delivery(Delivery::on_channel(TASK_DEADLINES_CHANNEL, priority));

        Ok(self.deliver(&message, NotificationKind::TaskDeadline, Some(deadline.user_id.clone())).await?)
    }

    pub async fn ai_report(&self, report: &AiReport) -> Result<String, NotifyError> {
        let token = self.require_token(&report.user_id).await?;
        let title = if report.report_type == "weekly" { "🤖 AI週次レポート" } else { "📊 AI分析レポート" };
        let report_data = match &report.report_data {
            Some(Value::Null) | None => "{}".to_string(),
            Some(data) => data.to_string(),
        };

        let message = PushMessage::new(PushTarget::Token(token), title, report.summary.clone())
            .with_entry("type", NotificationKind::AiReport.as_str())
            .with_entry("reportType", report.report_type.clone())
            .with_entry("userId", report.user_id.clone())
            .with_entry("summary", report.summary.clone())
            .with_entry("reportData", report_data)
            .with_delivery(Delivery::on_channel(AI_REPORTS_CHANNEL, NotificationPriority::Normal));

        Ok(self.deliver(&message, NotificationKind::AiReport, Some(report.user_id.clone())).await?)
    }

    pub async fn register_token(
        &self,
        user_id: &str,
        fcm_token: &str,
        platform: Option<&str>,
    ) -> Result<(), NotifyError> {
        let platform = platform.filter(|p| !p.is_empty()).unwrap_or(UNKNOWN_PLATFORM);
        self.store
            .register_device(DeviceRegistration {
                user_id: user_id.to_string(),
                fcm_token: fcm_token.to_string(),
                platform: platform.to_string(),
                token_updated_at: Utc::now(),
            })
            .await?;
        tracing::info!(user_id, platform, "device token registered");
        Ok(())
    }

    pub async fn history(
        &self,
        user_id: &str,
        limit: usize,
        start_after: Option<&str>,
    ) -> Result<HistoryPage, NotifyError> {
        Ok(self.store.history(user_id, limit, start_after).await?)
    }

    async fn require_token(&self, user_id: &str) -> Result<String, NotifyError> {
        self.store
            .device(user_id)
            .await?
            .as_ref()
            .and_then(usable_token)
            .ok_or_else(|| NotifyError::MissingToken(user_id.to_string()))
    }

    async fn deliver(
        &self,
        message: &PushMessage,
        kind: NotificationKind,
        user_id: Option<String>,
    ) -> wellfin_core::Result<String> {
        let span = notification_send_span(kind.as_str(), 1);
        let outcome = self.messenger.send(message).instrument(span).await;
        match &outcome {
            Ok(id) => tracing::info!(kind = kind.as_str(), message_id = %id, "notification sent"),
            Err(e) => tracing::error!(kind = kind.as_str(), error = %e, "notification send failed"),
        }
        self.record_attempt(message, kind, user_id, &outcome).await;
        outcome
    }

    /// History is best effort; a store failure never fails the send.
    async fn record_attempt(
        &self,
        message: &PushMessage,
        kind: NotificationKind,
        user_id: Option<String>,
        outcome: &wellfin_core::Result<String>,
    ) {
        let record = NotificationRecord {
            id: String::new(),
            recipient_user_id: user_id,
            recipient: message.target.as_str().to_string(),
            kind,
            title: message.title.clone(),
            body: message.body.clone(),
            data: message.data.clone(),
            status: if outcome.is_ok() { DeliveryStatus::Sent } else { DeliveryStatus::Failed },
            message_id: outcome.as_ref().ok().cloned(),
            error: outcome.as_ref().err().map(|e| e.to_string()),
            sent_at: Utc::now(),
        };
        if let Err(e) = self.store.record(record).await {
            tracing::warn!(error = %e, "failed to record notification history");
        }
    }
}

fn usable_token(device: &DeviceRegistration) -> Option<String> {
    Some(device.fcm_token.clone()).filter(|t| !t.trim().is_empty())
}

/// Shorthand for the data map of generic sends.
pub fn data_map(data: Option<&serde_json::Map<String, Value>>) -> BTreeMap<String, String> {
    data.map(super::message::stringify_data).unwrap_or_default()
}
