// src/handlers/relay.rs
//
// The two stateless relay endpoints. Each does exactly one outbound call and
// passes the upstream's JSON through unchanged; they share nothing beyond
// the HTTP client in AppState.
use crate::upstream_client::{is_allowed_data_url, UpstreamError};
use crate::AppState;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub fn relay_routes() -> Router {
    Router::new()
        .route("/api/prompt", post(prompt_relay))
        .route("/api/data", post(data_relay))
}

#[derive(Deserialize)]
struct PromptRequest {
    question: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataRequest {
    api_url: String,
}

/// Forward a free-text question to the interpreter and return its answer
/// verbatim. No schema validation happens here: a structurally different
/// JSON object goes back to the caller untouched.
async fn prompt_relay(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<PromptRequest>,
) -> Response {
    match state.upstream.interpret_raw(&req.question).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => relay_failure("prompt", e),
    }
}

/// Forward to the data-service URL the caller supplies. The URL must sit on
/// the data service's domain; anything else is refused without an outbound
/// call. The accepted response is passed through unchanged.
async fn data_relay(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<DataRequest>,
) -> Response {
    if !is_allowed_data_url(&req.api_url) {
        tracing::warn!("🚫 Refusing to relay to disallowed URL: {}", req.api_url);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "URL is not on the data service domain" })),
        )
            .into_response();
    }

    match state.upstream.fetch_raw(&req.api_url).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => relay_failure("data", e),
    }
}

/// Uniform failure envelope. The three failure modes are logged distinctly
/// but the caller sees the same 500 shape for all of them.
fn relay_failure(which: &str, err: UpstreamError) -> Response {
    match &err {
        UpstreamError::Status { status } => {
            tracing::warn!("{} relay: upstream answered with status {}", which, status)
        }
        UpstreamError::Malformed { body } => tracing::warn!(
            "{} relay: upstream answered 2xx with an unparsable body ({} bytes)",
            which,
            body.len()
        ),
        UpstreamError::Network(e) => {
            tracing::error!("{} relay: call never completed: {}", which, e)
        }
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_mode_maps_to_500() {
        let status_err = UpstreamError::Status { status: 503 };
        let malformed = UpstreamError::Malformed {
            body: "<html>oops</html>".to_string(),
        };
        assert_eq!(
            relay_failure("prompt", status_err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            relay_failure("data", malformed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn data_request_uses_camel_case_key() {
        let req: DataRequest =
            serde_json::from_str(r#"{"apiUrl": "https://data.cityscout-api.com/v1/events"}"#)
                .unwrap();
        assert_eq!(req.api_url, "https://data.cityscout-api.com/v1/events");
        assert!(serde_json::from_str::<DataRequest>(r#"{"api_url": "x"}"#).is_err());
    }
}
