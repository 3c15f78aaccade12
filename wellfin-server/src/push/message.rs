use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value, json};

pub const DEFAULT_CHANNEL: &str = "default";
pub const HABIT_REMINDERS_CHANNEL: &str = "habit_reminders";
pub const TASK_DEADLINES_CHANNEL: &str = "task_deadlines";
pub const AI_REPORTS_CHANNEL: &str = "ai_reports";

const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
const DEFAULT_SOUND: &str = "default";

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Token(String),
    Topic(String),
}

impl PushTarget {
    pub fn as_str(&self) -> &str {
        match self {
            PushTarget::Token(token) | PushTarget::Topic(token) => token,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationPriority {
    Max,
    #[default]
    High,
    Normal,
}

impl NotificationPriority {
    fn android_message_priority(self) -> &'static str {
        match self {
            NotificationPriority::Max | NotificationPriority::High => "HIGH",
            NotificationPriority::Normal => "NORMAL",
        }
    }

    fn android_notification_priority(self) -> &'static str {
        match self {
            NotificationPriority::Max => "PRIORITY_MAX",
            NotificationPriority::High => "PRIORITY_HIGH",
            NotificationPriority::Normal => "PRIORITY_DEFAULT",
        }
    }

    /// APNs wants `10` for immediate delivery and `5` otherwise.
    fn apns_priority(self) -> &'static str {
        match self {
            NotificationPriority::Max | NotificationPriority::High => "10",
            NotificationPriority::Normal => "5",
        }
    }
}

/// Client-supplied delivery knobs on the generic send endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    pub channel_id: Option<String>,
    pub priority: Option<String>,
    pub sound: Option<String>,
    pub badge: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel_id: String,
    pub priority: NotificationPriority,
    pub sound: String,
    pub badge: Option<u32>,
    pub click_action: Option<String>,
}

impl Default for Delivery {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL.to_string(),
            priority: NotificationPriority::High,
            sound: DEFAULT_SOUND.to_string(),
            badge: None,
            click_action: None,
        }
    }
}

impl Delivery {
    pub fn on_channel(channel_id: &str, priority: NotificationPriority) -> Self {
        Self { channel_id: channel_id.to_string(), priority, ..Default::default() }
    }

    /// Generic sends open the app on tap and badge the icon.
    pub fn from_options(options: &SendOptions) -> Self {
        let priority = match options.priority.as_deref() {
            Some("max") => NotificationPriority::Max,
            Some("normal") | Some("default") | Some("low") => NotificationPriority::Normal,
            _ => NotificationPriority::High,
        };
        Self {
            channel_id: options.channel_id.clone().unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            priority,
            sound: options.sound.clone().unwrap_or_else(|| DEFAULT_SOUND.to_string()),
            badge: Some(options.badge.unwrap_or(1)),
            click_action: Some(CLICK_ACTION.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub target: PushTarget,
    pub title: String,
    pub body: String,
    /// FCM only carries string values.
    pub data: BTreeMap<String, String>,
    pub delivery: Delivery,
}

impl PushMessage {
    pub fn new(target: PushTarget, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            target,
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
            delivery: Delivery::default(),
        }
    }

    pub fn with_data(mut self, data: BTreeMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Same message, different recipient.
    pub fn retarget(&self, target: PushTarget) -> Self {
        Self { target, ..self.clone() }
    }

    /// The FCM HTTP v1 `message` object.
    pub fn to_fcm(&self) -> Value {
        let mut message = Map::new();
        match &self.target {
            PushTarget::Token(token) => message.insert("token".into(), json!(token)),
            PushTarget::Topic(topic) => message.insert("topic".into(), json!(topic)),
        };
        message.insert("notification".into(), json!({ "title": self.title, "body": self.body }));
        if !self.data.is_empty() {
            message.insert("data".into(), json!(self.data));
        }

        let delivery = &self.delivery;
        let mut android_notification = json!({
            "channel_id": delivery.channel_id,
            "sound": delivery.sound,
            "notification_priority": delivery.priority.android_notification_priority(),
        });
        if let Some(action) = &delivery.click_action {
            android_notification["click_action"] = json!(action);
        }
        message.insert(
            "android".into(),
            json!({
                "priority": delivery.priority.android_message_priority(),
                "notification": android_notification,
            }),
        );

        let mut aps = json!({ "sound": delivery.sound });
        if let Some(badge) = delivery.badge {
            aps["badge"] = json!(badge);
        }
        message.insert(
            "apns".into(),
            json!({
                "headers": { "apns-priority": delivery.priority.apns_priority() },
                "payload": { "aps": aps },
            }),
        );

        Value::Object(message)
    }
}

/// Flattens arbitrary JSON data into FCM's string map.
pub fn stringify_data(data: &Map<String, Value>) -> BTreeMap<String, String> {
    data.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_options_defaults() {
        let delivery = Delivery::from_options(&SendOptions::default());
        assert_eq!(delivery.channel_id, DEFAULT_CHANNEL);
        assert_eq!(delivery.badge, Some(1));
        assert_eq!(delivery.click_action.as_deref(), Some(CLICK_ACTION));
        assert_eq!(delivery.priority, NotificationPriority::High);
    }

    #[test]
    fn test_fcm_payload_for_token() {
        let message = PushMessage::new(PushTarget::Token("tok".into()), "t", "b")
            .with_entry("type", "habit_reminder")
            .with_delivery(Delivery::on_channel(HABIT_REMINDERS_CHANNEL, NotificationPriority::High));
        let fcm = message.to_fcm();

        assert_eq!(fcm["token"], "tok");
        assert!(fcm.get("topic").is_none());
        assert_eq!(fcm["notification"]["title"], "t");
        assert_eq!(fcm["data"]["type"], "habit_reminder");
        assert_eq!(fcm["android"]["notification"]["channel_id"], HABIT_REMINDERS_CHANNEL);
        assert_eq!(fcm["apns"]["headers"]["apns-priority"], "10");
        assert!(fcm["apns"]["payload"]["aps"].get("badge").is_none());
    }

    #[test]
    fn test_normal_priority_maps_to_apns_five() {
        let options = SendOptions { priority: Some("normal".into()), badge: Some(3), ..Default::default() };
        let fcm = PushMessage::new(PushTarget::Topic("news".into()), "t", "b")
            .with_delivery(Delivery::from_options(&options))
            .to_fcm();

        assert_eq!(fcm["topic"], "news");
        assert_eq!(fcm["android"]["priority"], "NORMAL");
        assert_eq!(fcm["apns"]["headers"]["apns-priority"], "5");
        assert_eq!(fcm["apns"]["payload"]["aps"]["badge"], 3);
        assert!(fcm.get("data").is_none());
    }

    #[test]
    fn test_stringify_data() {
        let data = json!({"a": "x", "n": 3, "b": true, "o": {"k": 1}, "z": null});
        let flat = stringify_data(data.as_object().unwrap());
        assert_eq!(flat["a"], "x");
        assert_eq!(flat["n"], "3");
        assert_eq!(flat["b"], "true");
        assert_eq!(flat["o"], "{\"k\":1}");
        assert_eq!(flat["z"], "");
    }
}
