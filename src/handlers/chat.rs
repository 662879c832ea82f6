// src/handlers/chat.rs
use crate::chat::SubmitOutcome;
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub fn chat_routes() -> Router {
    Router::new()
        .route("/api/chat/session", post(create_session))
        .route("/api/chat/session/:session_id", get(get_session))
        .route("/api/chat/session/:session_id/message", post(post_message))
        .route(
            "/api/chat/session/:session_id/select",
            post(select_item).delete(deselect_item),
        )
}

#[derive(Deserialize)]
struct MessageRequest {
    text: String,
}

#[derive(Deserialize)]
struct SelectRequest {
    index: usize,
}

fn unknown_session() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "unknown session" })),
    )
        .into_response()
}

/// Create a conversation and run its start transition: the response already
/// carries the seeded greeting.
async fn create_session(Extension(state): Extension<Arc<AppState>>) -> Response {
    let snapshot = state.sessions.create().await;
    Json(snapshot).into_response()
}

async fn get_session(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Response {
    match state.sessions.snapshot(session_id).await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => unknown_session(),
    }
}

/// The submit transition. Responds once both relay calls have resolved (or
/// the submit was rejected by admission control), with the transcript as it
/// stands afterwards.
async fn post_message(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let outcome = match state
        .sessions
        .submit(session_id, &req.text, &state.upstream)
        .await
    {
        Some(outcome) => outcome,
        None => return unknown_session(),
    };

    // snapshot can only be missing if the session vanished mid-flight
    let snapshot = match state.sessions.snapshot(session_id).await {
        Some(snapshot) => snapshot,
        None => return unknown_session(),
    };

    Json(json!({
        "accepted": outcome != SubmitOutcome::Rejected,
        "session": snapshot,
    }))
    .into_response()
}

/// Select one card from the latest results for the detail view. The
/// response reports the selected item's own price, with "0"/"free" shown
/// as "Free".
async fn select_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Response {
    let item = match state.sessions.select(session_id, req.index).await {
        Some(item) => item,
        None => return unknown_session(),
    };
    let price_label = item.as_ref().and_then(|i| i.price_label());
    Json(json!({
        "selected": item.is_some(),
        "item": item,
        "priceLabel": price_label,
    }))
    .into_response()
}

async fn deselect_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Response {
    match state.sessions.deselect(session_id).await {
        Some(()) => Json(json!({ "selected": false })).into_response(),
        None => unknown_session(),
    }
}
