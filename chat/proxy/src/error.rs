//! Proxy Error Responses
//!
//! Every failure the proxy reports maps to one fixed status and JSON body.
//! Upstream detail never reaches the caller; it goes to the log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use lanyard_core::ErrorBody;

/// Client-visible proxy failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProxyError {
    /// Anything other than OPTIONS or POST
    #[error("method not allowed")]
    MethodNotAllowed,

    /// POST without a truthy `query`
    #[error("query is required")]
    QueryRequired,

    /// Upstream unreachable, non-2xx or not JSON
    #[error("upstream failed")]
    UpstreamFailed,
}

impl ProxyError {
    /// HTTP status for this failure
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::QueryRequired => StatusCode::BAD_REQUEST,
            Self::UpstreamFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this failure
    #[must_use]
    pub fn body(self) -> ErrorBody {
        match self {
            Self::MethodNotAllowed => ErrorBody::method_not_allowed(),
            Self::QueryRequired => ErrorBody::query_required(),
            Self::UpstreamFailed => ErrorBody::upstream_failed(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
