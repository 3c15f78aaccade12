use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wellfin_agent::PlanningService;
use wellfin_auth::ApiKeyGate;
use wellfin_gemini::TokenSource;
use wellfin_model::MockModel;
use wellfin_server::{
    FcmMessenger, InMemoryNotificationStore, NotificationService, ServerConfig, create_app,
};
use wiremock::matchers::{body_partial_json, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "wf-test-key-123";
const SEND_PATH: &str = "/v1/projects/wellfin-test/messages:send";

async fn fcm_app(server: &MockServer) -> Router {
    let messenger = FcmMessenger::new(
        reqwest::Client::new(),
        "wellfin-test",
        TokenSource::Static("fcm-token".to_string()),
    )
    .unwrap()
    .with_endpoint(Url::parse(&format!("{}/", server.uri())).unwrap());
    let notifications = Arc::new(NotificationService::new(
        Arc::new(messenger),
        Arc::new(InMemoryNotificationStore::new()),
    ));

    let planning = Arc::new(PlanningService::new(Arc::new(MockModel::new("m"))));
    let gate = Arc::new(ApiKeyGate::new().with_key(KEY));
    create_app(ServerConfig::new(planning, gate).with_notifications(notifications))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).header("x-api-key", KEY).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn accept_all(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header_is("authorization", "Bearer fcm-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "projects/wellfin-test/messages/1"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn direct_send_builds_fcm_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "message": {
                "token": "device-1",
                "notification": {"title": "こんにちは", "body": "テスト"},
                "data": {"count": "3"},
                "android": {"notification": {"channel_id": "default", "click_action": "FLUTTER_NOTIFICATION_CLICK"}},
                "apns": {"headers": {"apns-priority": "10"}, "payload": {"aps": {"badge": 1}}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "projects/wellfin-test/messages/42"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = fcm_app(&server).await;
    let (status, body) = send(
        &app,
        post(
            "/api/v1/push-notifications/send",
            json!({"token": "device-1", "title": "こんにちは", "body": "テスト", "data": {"count": 3}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "projects/wellfin-test/messages/42");
    assert_eq!(body["message"], "プッシュ通知を送信しました");
}

#[tokio::test]
async fn direct_send_validation_and_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("UNREGISTERED"))
        .mount(&server)
        .await;
    let app = fcm_app(&server).await;

    let (status, body) =
        send(&app, post("/api/v1/push-notifications/send", json!({"token": "t", "title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "token, title, bodyは必須です"}));

    let (status, body) =
        send(&app, post("/api/v1/push-notifications/send", json!({"token": "t", "title": "x", "body": "y"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "プッシュ通知の送信に失敗しました");
    assert!(body["details"].as_str().unwrap().contains("UNREGISTERED"));
}

#[tokio::test]
async fn topic_send() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({"message": {"topic": "weekly-tips"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "projects/wellfin-test/messages/7"})))
        .expect(1)
        .mount(&server)
        .await;
    let app = fcm_app(&server).await;

    let (status, body) = send(
        &app,
        post("/api/v1/push-notifications/send-topic", json!({"topic": "weekly-tips", "title": "t", "body": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "トピック「weekly-tips」にプッシュ通知を送信しました");
}

#[tokio::test]
async fn multicast_reports_each_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({"message": {"token": "stale"}})))
        .respond_with(ResponseTemplate::new(404).set_body_string("UNREGISTERED"))
        .mount(&server)
        .await;
    accept_all(&server).await;
    let app = fcm_app(&server).await;

    let (status, body) = send(
        &app,
        post("/api/v1/push-notifications/send-multiple", json!({"tokens": [], "title": "t", "body": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "tokensは空でない配列である必要があります");

    let (status, body) = send(
        &app,
        post(
            "/api/v1/push-notifications/send-multiple",
            json!({"tokens": ["a", "stale", "b"], "title": "t", "body": "b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successCount"], 2);
    assert_eq!(body["failureCount"], 1);
    assert_eq!(body["results"][1]["token"], "stale");
    assert_eq!(body["results"][1]["success"], false);
    assert_eq!(body["message"], "2件の通知を送信しました");
}

#[tokio::test]
async fn user_targeted_notifications_and_history() {
    let server = MockServer::start().await;
    accept_all(&server).await;
    let app = fcm_app(&server).await;

    let habit = json!({"userId": "u1", "habitName": "読書"});
    let (status, body) = send(&app, post("/api/v1/push-notifications/habit-reminder", habit.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ユーザーが見つかりません");

    let deadline = json!({"userId": "u1", "taskName": "月次レポート", "dueDate": "2025-01-31", "beforeMinutes": 90});
    let (status, body) = send(&app, post("/api/v1/push-notifications/task-deadline", deadline.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ユーザーのFCMトークンが設定されていません");

    let (status, body) = send(
        &app,
        post("/api/v1/push-notifications/register-token", json!({"userId": "u1", "fcmToken": "device-u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "FCMトークンを登録しました");

    let (status, body) = send(&app, post("/api/v1/push-notifications/habit-reminder", habit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "習慣リマインダー「読書」を送信しました");

    let (status, body) = send(&app, post("/api/v1/push-notifications/task-deadline", deadline)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "タスク締切アラート「月次レポート」を送信しました");

    let report = json!({"userId": "u1", "reportType": "weekly", "summary": "今週は順調です"});
    let (status, body) = send(&app, post("/api/v1/push-notifications/ai-report", report)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AI分析レポート（weekly）を送信しました");

    let (status, body) = send(&app, get("/api/v1/push-notifications/history/u1?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["hasMore"], true);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["title"], "🤖 AI週次レポート");
    assert_eq!(history[1]["body"], "「月次レポート」の締切まで1時間30分です");
    assert_eq!(history[1]["status"], "sent");

    let cursor = history[1]["id"].as_str().unwrap().to_string();
    let (_, body) = send(&app, get(&format!("/api/v1/push-notifications/history/u1?startAfter={cursor}"))).await;
    assert_eq!(body["history"][0]["title"], "🌟 習慣リマインダー");
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn push_routes_require_key() {
    let server = MockServer::start().await;
    let app = fcm_app(&server).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/push-notifications/send")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API key required");
}
