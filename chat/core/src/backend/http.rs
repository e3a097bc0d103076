//! HTTP Backend
//!
//! Forwards a query to the remote chatbot: `POST {base_url}/chat` with
//! `{"query": ...}`, expecting a JSON body back.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{BackendError, ChatBackend};
use crate::wire::ChatRequest;

/// Remote chatbot client
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for `base_url`
    ///
    /// `timeout` of `None` means the request waits as long as the upstream
    /// takes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the URL is not absolute http(s),
    /// or [`BackendError::Transport`] if the client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::Config(format!(
                "upstream URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// The upstream base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat endpoint URL
    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn ask(&self, request: &ChatRequest) -> Result<Value, BackendError> {
        let response = self
            .http_client
            .post(self.chat_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(BackendError::Decode)
    }
}
