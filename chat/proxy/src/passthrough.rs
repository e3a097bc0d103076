//! Dev Passthrough
//!
//! During local development the front end calls `/api/<path>` and expects
//! it to reach `<upstream>/<path>` untouched. This module does that
//! rewrite. It is only mounted with `--dev-passthrough`.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use lanyard_core::BackendError;

use crate::error::ProxyError;
use crate::state::ProxyState;

/// Forwarding target for `/api/*`
#[derive(Clone, Debug)]
pub struct Passthrough {
    upstream: String,
    client: reqwest::Client,
}

impl Passthrough {
    /// Forward to `upstream` (base URL, trailing slash ignored)
    ///
    /// # Errors
    ///
    /// Fails on a non-http(s) URL or if the HTTP client cannot be built.
    pub fn new(upstream: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let upstream = upstream.into().trim_end_matches('/').to_string();
        if !(upstream.starts_with("http://") || upstream.starts_with("https://")) {
            return Err(BackendError::Config(format!(
                "passthrough target must start with http:// or https://, got '{upstream}'"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            upstream,
            client: builder.build()?,
        })
    }

    /// Rewrite an `/api/` suffix and query string to the upstream URL
    #[must_use]
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(q) if !q.is_empty() => format!("{}/{path}?{q}", self.upstream),
            _ => format!("{}/{path}", self.upstream),
        }
    }

    async fn forward(
        &self,
        method: Method,
        url: &str,
        content_type: Option<&HeaderValue>,
        body: Bytes,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.client.request(method, url).body(body);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type.clone());
        }

        let upstream = request.send().await?;
        let status = upstream.status();
        let mut headers = HeaderMap::new();
        if let Some(content_type) = upstream.headers().get(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }
        let bytes = upstream.bytes().await?;

        Ok((status, headers, bytes).into_response())
    }
}

/// `/api/{*path}` handler
pub(crate) async fn handle_passthrough(
    State(state): State<ProxyState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(passthrough) = state.passthrough.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let url = passthrough.target_url(&path, query.as_deref());
    tracing::debug!(%method, url = %url, "Forwarding dev passthrough request");

    match passthrough
        .forward(method, &url, headers.get(header::CONTENT_TYPE), body)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, url = %url, "Passthrough request failed");
            ProxyError::UpstreamFailed.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_rewrites_prefix() {
        let passthrough = Passthrough::new("https://chatbot.example.com/", None).unwrap();
        assert_eq!(
            passthrough.target_url("status", None),
            "https://chatbot.example.com/status"
        );
        assert_eq!(
            passthrough.target_url("/v1/models", Some("limit=2")),
            "https://chatbot.example.com/v1/models?limit=2"
        );
        assert_eq!(
            passthrough.target_url("health", Some("")),
            "https://chatbot.example.com/health"
        );
    }

    #[test]
    fn test_rejects_relative_target() {
        assert!(Passthrough::new("/api", None).is_err());
    }
}
