//! Push notifications: message model, transports, delivery history.

pub mod fcm;
pub mod message;
pub mod messenger;
pub mod service;
pub mod store;

pub use fcm::FcmMessenger;
pub use message::{Delivery, NotificationPriority, PushMessage, PushTarget, SendOptions};
pub use messenger::Messenger;
pub use service::{
    AiReport, HabitReminder, MulticastReport, NotificationService, NotifyError, RecipientResult,
    TaskDeadline,
};
pub use store::{
    DeliveryStatus, DeviceRegistration, HistoryPage, InMemoryNotificationStore, NotificationKind,
    NotificationRecord, NotificationStore,
};
