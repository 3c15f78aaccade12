pub mod controllers;
pub mod envelope;
pub mod error;

pub use controllers::{
    AnalyzeController, NotificationsController, RecommendationsController, ScheduleController,
    SystemController,
};
pub use envelope::{ApiJson, Metadata, Stamp};
pub use error::ApiError;

use crate::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use wellfin_auth::{API_KEY_HEADER, require_api_key};

/// Build CORS layer based on security configuration
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, HeaderName::from_static(API_KEY_HEADER)]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn push_router(config: &ServerConfig) -> Option<Router> {
    let service = config.notifications.clone()?;
    let router = Router::new()
        .route("/send", post(controllers::notifications::send))
        .route("/send-topic", post(controllers::notifications::send_topic))
        .route("/send-multiple", post(controllers::notifications::send_multiple))
        .route("/habit-reminder", post(controllers::notifications::habit_reminder))
        .route("/task-deadline", post(controllers::notifications::task_deadline))
        .route("/ai-report", post(controllers::notifications::ai_report))
        .route("/register-token", post(controllers::notifications::register_token))
        .route("/history/{user_id}", get(controllers::notifications::history))
        .with_state(NotificationsController::new(service));
    Some(router)
}

/// Create the HTTP application.
///
/// Everything except the paths exempted by the [`ApiKeyGate`](wellfin_auth::ApiKeyGate)
/// requires an `X-API-Key` header.
pub fn create_app(config: ServerConfig) -> Router {
    let system_controller = SystemController::new(&config);
    let analyze_controller = AnalyzeController::new(config.planning.clone());
    let schedule_controller = ScheduleController::new(config.planning.clone());
    let recommendations_controller = RecommendationsController::new(config.planning.clone());

    let mut api_router = Router::new()
        .route("/vertex-ai-test", get(controllers::system::vertex_ai_test))
        .with_state(system_controller.clone())
        .route("/analyze-task", post(controllers::analyze::analyze_task))
        .with_state(analyze_controller)
        .route("/optimize-schedule", post(controllers::schedule::optimize_schedule))
        .with_state(schedule_controller)
        .route("/recommendations", post(controllers::recommendations::recommendations))
        .with_state(recommendations_controller);

    if let Some(push) = push_router(&config) {
        api_router = api_router.nest("/push-notifications", push);
    }

    let system_router = Router::new()
        .route("/", get(controllers::system::root))
        .route("/health", get(controllers::system::health))
        .route("/test-ai", get(controllers::system::test_ai))
        .with_state(system_controller);

    // The gate sees full paths, so it wraps the merged router.
    let app = Router::new()
        .nest("/api/v1", api_router)
        .merge(system_router)
        .layer(middleware::from_fn_with_state(config.gate.clone(), require_api_key));

    let app = match config.security.request_timeout {
        Some(timeout) => app.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
        None => app,
    };

    let cors_layer = build_cors_layer(&config);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            )),
    )
}
