use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::push::service::data_map;
use crate::push::{
    AiReport, Delivery, HabitReminder, HistoryPage, MulticastReport, NotificationRecord,
    NotificationService, NotifyError, PushMessage, PushTarget, SendOptions, TaskDeadline,
};
use crate::rest::envelope::ApiJson;
use crate::rest::error::ApiError;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Clone)]
pub struct NotificationsController {
    service: Arc<NotificationService>,
}

impl NotificationsController {
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Maps service failures to the notification error bodies.
fn send_failed(failure: &'static str) -> impl Fn(NotifyError) -> ApiError {
    move |err| match err {
        NotifyError::UnknownUser(_) => ApiError::Notification {
            status: StatusCode::NOT_FOUND,
            message: "ユーザーが見つかりません".to_string(),
            details: None,
        },
        NotifyError::MissingToken(_) => {
            ApiError::notification_invalid("ユーザーのFCMトークンが設定されていません")
        }
        NotifyError::Delivery(e) => ApiError::notification_failed(failure, e),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub message: String,
}

impl SendResponse {
    fn sent(message_id: String, message: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, message_id: Some(message_id), message: message.into() })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectSendBody {
    pub token: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub options: Option<SendOptions>,
}

fn generic_message(
    target: PushTarget,
    title: &str,
    body: &str,
    data: Option<&Map<String, Value>>,
    options: Option<&SendOptions>,
) -> PushMessage {
    PushMessage::new(target, title, body)
        .with_data(data_map(data))
        .with_delivery(Delivery::from_options(&options.cloned().unwrap_or_default()))
}

pub async fn send(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<DirectSendBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(token), Some(title), Some(text)) = (present(&body.token), present(&body.title), present(&body.body))
    else {
        return Err(ApiError::notification_invalid("token, title, bodyは必須です"));
    };

    let message = generic_message(
        PushTarget::Token(token.to_string()),
        title,
        text,
        body.data.as_ref(),
        body.options.as_ref(),
    );
    let message_id =
        controller.service.send_to_token(message).await.map_err(send_failed("プッシュ通知の送信に失敗しました"))?;
    Ok(SendResponse::sent(message_id, "プッシュ通知を送信しました"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSendBody {
    pub topic: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub options: Option<SendOptions>,
}

pub async fn send_topic(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<TopicSendBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(topic), Some(title), Some(text)) = (present(&body.topic), present(&body.title), present(&body.body))
    else {
        return Err(ApiError::notification_invalid("topic, title, bodyは必須です"));
    };

    let message = generic_message(
        PushTarget::Topic(topic.to_string()),
        title,
        text,
        body.data.as_ref(),
        body.options.as_ref(),
    );
    let message_id =
        controller.service.send_to_topic(message).await.map_err(send_failed("トピック通知の送信に失敗しました"))?;
    Ok(SendResponse::sent(message_id, format!("トピック「{topic}」にプッシュ通知を送信しました")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastBody {
    pub tokens: Option<Value>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub options: Option<SendOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: MulticastReport,
    pub message: String,
}

pub async fn send_multiple(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<MulticastBody>,
) -> Result<Json<MulticastResponse>, ApiError> {
    let tokens: Vec<String> = match &body.tokens {
        Some(Value::Array(items)) if !items.is_empty() => {
            items.iter().filter_map(Value::as_str).filter(|t| !t.trim().is_empty()).map(str::to_string).collect()
        }
        _ => Vec::new(),
    };
    if tokens.is_empty() {
        return Err(ApiError::notification_invalid("tokensは空でない配列である必要があります"));
    }
    let (Some(title), Some(text)) = (present(&body.title), present(&body.body)) else {
        return Err(ApiError::notification_invalid("title, bodyは必須です"));
    };

    let template = generic_message(
        PushTarget::Token(String::new()),
        title,
        text,
        body.data.as_ref(),
        body.options.as_ref(),
    );
    let report = controller.service.send_multiple(&tokens, &template).await;
    let message = format!("{}件の通知を送信しました", report.success_count);
    Ok(Json(MulticastResponse { success: true, report, message }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitReminderBody {
    pub user_id: Option<String>,
    pub habit_name: Option<String>,
    pub reminder_time: Option<String>,
    pub custom_message: Option<String>,
}

pub async fn habit_reminder(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<HabitReminderBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(user_id), Some(habit_name)) = (present(&body.user_id), present(&body.habit_name)) else {
        return Err(ApiError::notification_invalid("userId, habitNameは必須です"));
    };

    let reminder = HabitReminder {
        user_id: user_id.to_string(),
        habit_name: habit_name.to_string(),
        reminder_time: body.reminder_time.clone(),
        custom_message: body.custom_message.clone(),
    };
    let message_id = controller
        .service
        .habit_reminder(&reminder)
        .await
        .map_err(send_failed("習慣リマインダーの送信に失敗しました"))?;
    Ok(SendResponse::sent(message_id, format!("習慣リマインダー「{habit_name}」を送信しました")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeadlineBody {
    pub user_id: Option<String>,
    pub task_name: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub before_minutes: Option<u32>,
}

pub async fn task_deadline(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<TaskDeadlineBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(user_id), Some(task_name), Some(due_date)) =
        (present(&body.user_id), present(&body.task_name), present(&body.due_date))
    else {
        return Err(ApiError::notification_invalid("userId, taskName, dueDateは必須です"));
    };

    let deadline = TaskDeadline {
        user_id: user_id.to_string(),
        task_name: task_name.to_string(),
        due_date: due_date.to_string(),
        priority: body.priority.clone().filter(|p| !p.is_empty()),
        before_minutes: body.before_minutes,
    };
    let message_id = controller
        .service
        .task_deadline(&deadline)
        .await
        .map_err(send_failed("タスク締切アラートの送信に失敗しました"))?;
    Ok(SendResponse::sent(message_id, format!("タスク締切アラート「{task_name}」を送信しました")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReportBody {
    pub user_id: Option<String>,
    pub report_type: Option<String>,
    pub summary: Option<String>,
    pub report_data: Option<Value>,
}

pub async fn ai_report(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<AiReportBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(user_id), Some(report_type), Some(summary)) =
        (present(&body.user_id), present(&body.report_type), present(&body.summary))
    else {
        return Err(ApiError::notification_invalid("userId, reportType, summaryは必須です"));
    };

    let report = AiReport {
        user_id: user_id.to_string(),
        report_type: report_type.to_string(),
        summary: summary.to_string(),
        report_data: body.report_data.clone(),
    };
    let message_id = controller
        .service
        .ai_report(&report)
        .await
        .map_err(send_failed("AI分析レポートの送信に失敗しました"))?;
    Ok(SendResponse::sent(message_id, format!("AI分析レポート（{report_type}）を送信しました")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTokenBody {
    pub user_id: Option<String>,
    pub fcm_token: Option<String>,
    pub platform: Option<String>,
}

pub async fn register_token(
    State(controller): State<NotificationsController>,
    ApiJson(body): ApiJson<RegisterTokenBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(user_id), Some(fcm_token)) = (present(&body.user_id), present(&body.fcm_token)) else {
        return Err(ApiError::notification_invalid("userId, fcmTokenは必須です"));
    };

    controller
        .service
        .register_token(user_id, fcm_token, body.platform.as_deref())
        .await
        .map_err(send_failed("FCMトークンの登録に失敗しました"))?;
    Ok(Json(SendResponse { success: true, message_id: None, message: "FCMトークンを登録しました".to_string() }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub start_after: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<NotificationRecord>,
    pub has_more: bool,
}

pub async fn history(
    State(controller): State<NotificationsController>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
    let cursor = query.start_after.as_deref().filter(|c| !c.is_empty());

    let HistoryPage { history, has_more } = controller
        .service
        .history(&user_id, limit, cursor)
        .await
        .map_err(send_failed("通知履歴の取得に失敗しました"))?;
    Ok(Json(HistoryResponse { success: true, history, has_more }))
}
