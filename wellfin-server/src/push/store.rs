use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use wellfin_core::{Result, WellfinError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub user_id: String,
    pub fcm_token: String,
    pub platform: String,
    pub token_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Direct,
    Topic,
    Multicast,
    HabitReminder,
    TaskDeadline,
    AiReport,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Direct => "direct",
            NotificationKind::Topic => "topic",
            NotificationKind::Multicast => "multicast",
            NotificationKind::HabitReminder => "habit_reminder",
            NotificationKind::TaskDeadline => "task_deadline",
            NotificationKind::AiReport => "ai_report",
        }
    }
}

/// One delivery attempt. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_user_id: Option<String>,
    /// Device token or topic name.
    pub recipient: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    pub status: DeliveryStatus,
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// One page of a user's history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub history: Vec<NotificationRecord>,
    pub has_more: bool,
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Creates or replaces the user's device registration.
    async fn register_device(&self, registration: DeviceRegistration) -> Result<()>;

    async fn device(&self, user_id: &str) -> Result<Option<DeviceRegistration>>;

    /// The user a device token is registered to, if any.
    async fn owner_of(&self, fcm_token: &str) -> Result<Option<String>>;

    /// Stores the record and returns its id.
    async fn record(&self, record: NotificationRecord) -> Result<String>;

    /// Records for `user_id`, newest first, starting after the record `start_after`.
    async fn history(&self, user_id: &str, limit: usize, start_after: Option<&str>) -> Result<HistoryPage>;
}

/// Records kept per user (and for topic sends) before the oldest are dropped.
pub const DEFAULT_HISTORY_CAP: usize = 500;

#[derive(Default)]
struct StoreState {
    devices: HashMap<String, DeviceRegistration>,
    /// fcm token -> user id
    owners: HashMap<String, String>,
    /// Oldest first, at most `history_cap` per user.
    records: HashMap<String, VecDeque<NotificationRecord>>,
    unattributed: VecDeque<NotificationRecord>,
    next_id: u64,
}

/// Process-local store. Contents are lost on restart.
pub struct InMemoryNotificationStore {
    state: RwLock<StoreState>,
    history_cap: usize,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self { state: RwLock::default(), history_cap: DEFAULT_HISTORY_CAP }
    }
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps retained history per user; the oldest records are evicted first.
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap.max(1);
        self
    }

    #[cfg(test)]
    fn retained(&self) -> usize {
        self.state
            .read()
            .map(|state| state.records.values().map(VecDeque::len).sum::<usize>() + state.unattributed.len())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> WellfinError {
    WellfinError::Storage("notification store lock poisoned".to_string())
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn register_device(&self, registration: DeviceRegistration) -> Result<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if let Some(previous) = state.devices.get(&registration.user_id).map(|d| d.fcm_token.clone()) {
            if state.owners.get(&previous) == Some(&registration.user_id) {
                state.owners.remove(&previous);
            }
        }
        state.owners.insert(registration.fcm_token.clone(), registration.user_id.clone());
        state.devices.insert(registration.user_id.clone(), registration);
        Ok(())
    }

    async fn device(&self, user_id: &str) -> Result<Option<DeviceRegistration>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.devices.get(user_id).cloned())
    }

    async fn owner_of(&self, fcm_token: &str) -> Result<Option<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.owners.get(fcm_token).cloned())
    }

    async fn record(&self, mut record: NotificationRecord) -> Result<String> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.next_id += 1;
        record.id = format!("notif_{:08}", state.next_id);
        let id = record.id.clone();

        let bucket = match record.recipient_user_id.clone() {
            Some(user_id) => state.records.entry(user_id).or_default(),
            None => &mut state.unattributed,
        };
        bucket.push_back(record);
        while bucket.len() > self.history_cap {
            bucket.pop_front();
        }
        Ok(id)
    }

    async fn history(&self, user_id: &str, limit: usize, start_after: Option<&str>) -> Result<HistoryPage> {
        let state = self.state.read().map_err(poisoned)?;
        let Some(records) = state.records.get(user_id) else {
            return Ok(HistoryPage { history: Vec::new(), has_more: false });
        };
        let mut newest_first = records.iter().rev().peekable();

        if let Some(cursor) = start_after {
            // An unknown (or evicted) cursor yields an empty page.
            for record in newest_first.by_ref() {
                if record.id == cursor {
                    break;
                }
            }
        }

        let history: Vec<NotificationRecord> = newest_first.by_ref().take(limit).cloned().collect();
        let has_more = newest_first.peek().is_some();
        Ok(HistoryPage { history, has_more })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, title: &str) -> NotificationRecord {
        NotificationRecord {
            id: String::new(),
            recipient_user_id: Some(user.to_string()),
            recipient: "tok".to_string(),
            kind: NotificationKind::Direct,
            title: title.to_string(),
            body: "b".to_string(),
            data: BTreeMap::new(),
            status: DeliveryStatus::Sent,
            message_id: Some("m".to_string()),
            error: None,
            sent_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_replaces_device() {
        let store = InMemoryNotificationStore::new();
        for token in ["t1", "t2"] {
            store
                .register_device(DeviceRegistration {
                    user_id: "u1".into(),
                    fcm_token: token.into(),
                    platform: "ios".into(),
                    token_updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.device("u1").await.unwrap().unwrap().fcm_token, "t2");
        assert_eq!(store.owner_of("t2").await.unwrap().as_deref(), Some("u1"));
        assert!(store.owner_of("t1").await.unwrap().is_none());
        assert!(store.device("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_pages_newest_first() {
        let store = InMemoryNotificationStore::new();
        for i in 0..5 {
            store.record(record("u1", &format!("n{i}"))).await.unwrap();
        }
        store.record(record("u2", "other")).await.unwrap();

        let first = store.history("u1", 2, None).await.unwrap();
        let titles: Vec<&str> = first.history.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["n4", "n3"]);
        assert!(first.has_more);

        let cursor = first.history.last().unwrap().id.clone();
        let second = store.history("u1", 5, Some(&cursor)).await.unwrap();
        let titles: Vec<&str> = second.history.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["n2", "n1", "n0"]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_history_exact_page_has_no_more() {
        let store = InMemoryNotificationStore::new();
        store.record(record("u1", "a")).await.unwrap();
        store.record(record("u1", "b")).await.unwrap();

        let page = store.history("u1", 2, None).await.unwrap();
        assert_eq!(page.history.len(), 2);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_history_is_capped_per_user() {
        let store = InMemoryNotificationStore::new().with_history_cap(3);
        for i in 0..10 {
            store.record(record("u1", &format!("n{i}"))).await.unwrap();
        }
        store.record(record("u2", "other")).await.unwrap();
        let mut topic = record("u1", "topic");
        topic.recipient_user_id = None;
        for _ in 0..5 {
            store.record(topic.clone()).await.unwrap();
        }

        assert_eq!(store.retained(), 3 + 1 + 3);

        let first = store.history("u1", 2, None).await.unwrap();
        let titles: Vec<&str> = first.history.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["n9", "n8"]);
        assert!(first.has_more);

        let cursor = first.history.last().unwrap().id.clone();
        let second = store.history("u1", 5, Some(&cursor)).await.unwrap();
        let titles: Vec<&str> = second.history.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["n7"]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_default_cap_bounds_long_running_history() {
        let store = InMemoryNotificationStore::new();
        for i in 0..(DEFAULT_HISTORY_CAP + 250) {
            store.record(record("u1", &format!("n{i}"))).await.unwrap();
        }
        assert_eq!(store.retained(), DEFAULT_HISTORY_CAP);

        let page = store.history("u1", 1, None).await.unwrap();
        assert_eq!(page.history[0].title, format!("n{}", DEFAULT_HISTORY_CAP + 249));
    }
}
