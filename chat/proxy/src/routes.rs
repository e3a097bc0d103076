//! Router and Chat Handler
//!
//! `/api/chat` accepts every method and dispatches by hand, so the 405 and
//! preflight responses carry the exact bodies and headers browsers see from
//! the deployed function.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use lanyard_core::ChatRequest;

use crate::error::ProxyError;
use crate::passthrough::handle_passthrough;
use crate::state::ProxyState;

/// `Access-Control-Allow-Origin` on every response
pub const CORS_ALLOW_ORIGIN: &str = "*";
/// `Access-Control-Allow-Methods` on every response
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
/// `Access-Control-Allow-Headers` on every response
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Build the proxy router
pub fn create_router(state: ProxyState) -> Router {
    let mut router = Router::new()
        .route("/api/chat", any(handle_chat))
        .route("/healthz", get(health));

    if state.passthrough.is_some() {
        router = router.route("/api/{*path}", any(handle_passthrough));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
}

async fn health() -> &'static str {
    "ok"
}

/// `/api/chat`
async fn handle_chat(State(state): State<ProxyState>, method: Method, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::POST {
        return ProxyError::MethodNotAllowed.into_response();
    }

    // Unparseable or non-object bodies have no query
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let Some(request) = ChatRequest::from_body(&body) else {
        return ProxyError::QueryRequired.into_response();
    };

    match state.backend.ask(&request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            tracing::error!(
                error = %e,
                backend = state.backend.name(),
                "Chat API Error"
            );
            ProxyError::UpstreamFailed.into_response()
        }
    }
}
