use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::gate::{API_KEY_HEADER, ApiKeyGate};

/// Rejects requests without a valid `X-API-Key` unless the path is exempt.
///
/// Mount with `axum::middleware::from_fn_with_state(gate, require_api_key)`.
/// On success the [`ApiIdentity`](crate::ApiIdentity) is added to the request extensions.
pub async fn require_api_key(State(gate): State<Arc<ApiKeyGate>>, mut request: Request, next: Next) -> Response {
    if gate.is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let provided = request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    match gate.authenticate(provided) {
        Ok(identity) => {
            tracing::debug!(user_id = %identity.user_id, path = %request.uri().path(), "api key accepted");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "api key rejected");
            e.into_response()
        }
    }
}
