//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, OkResponse};
use super::AppState;
use crate::store::StateStore;
use crate::telegram::Update;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Bot API deliveries
        .route("/webhook/:token", post(receive_update))
        // Liveness
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn receive_update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Result<Json<Update>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    // The path is the only proof the caller knows the bot token
    if token != *state.webhook_token {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let Json(update) = body.map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed update");
        AppError::BadRequest(e.body_text())
    })?;

    state.controller.handle_update(update).await;
    Ok(Json(OkResponse { ok: true }))
}

// ============================================================
// Health
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_conversations: state.controller.store().active(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::RecordingMessenger;
    use crate::controller::{Controller, Messenger};
    use crate::store::{InMemoryStateStore, SessionKey, StateStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "123:secret";

    fn setup() -> (Router, Arc<RecordingMessenger>, AppState) {
        let messenger = Arc::new(RecordingMessenger::new());
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
        let outbound: Arc<dyn Messenger> = messenger.clone();
        let state = AppState::new(Arc::new(Controller::new(store, outbound)), TOKEN);
        (create_router(state.clone()), messenger, state)
    }

    fn post_update(path: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn start_update() -> Value {
        json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "chat": { "id": 5, "type": "private" },
                "from": { "id": 5, "is_bot": false, "first_name": "Ira" },
                "text": "/start"
            }
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_webhook_accepts_update() {
        let (app, messenger, state) = setup();

        let response = app
            .oneshot(post_update(&format!("/webhook/{TOKEN}"), &start_update()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));
        assert_eq!(messenger.sent().len(), 1);
        assert!(state.controller.store().load(SessionKey::new(5, 5)).conversation().is_some());
    }

    #[tokio::test]
    async fn test_webhook_wrong_token_is_not_found() {
        let (app, messenger, _) = setup();

        let response = app
            .oneshot(post_update("/webhook/guess", &start_update()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_ignores_unsupported_update() {
        let (app, messenger, _) = setup();

        let response = app
            .oneshot(post_update(
                &format!("/webhook/{TOKEN}"),
                &json!({ "update_id": 2, "edited_message": { "message_id": 1 } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_malformed_body() {
        let (app, _, _) = setup();

        let response = app
            .oneshot(post_update(&format!("/webhook/{TOKEN}"), &json!({ "message": 1 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = setup();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_conversations"], 0);
    }
}
