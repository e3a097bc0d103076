//! Proxy Client
//!
//! Sends the widget's outbound queries to the chat proxy and reports each
//! outcome back over a channel. Every query runs on its own task, so the
//! event loop never waits on the network.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use lanyard_core::{ChatRequest, OutboundQuery, ReplyOutcome, RequestToken};

/// A reply ready to hand to the widget
#[derive(Debug)]
pub struct ReplyEvent {
    /// Token of the query this answers
    pub token: RequestToken,
    /// What happened
    pub outcome: ReplyOutcome,
}

/// HTTP client for `POST {proxy}/api/chat`
#[derive(Clone, Debug)]
pub struct ProxyClient {
    chat_url: String,
    http: reqwest::Client,
}

impl ProxyClient {
    /// Client for the proxy at `proxy_url`
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(proxy_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            chat_url: format!("{}/api/chat", proxy_url.trim_end_matches('/')),
            http: builder.build()?,
        })
    }

    /// The chat endpoint
    #[must_use]
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Send one query and classify the result
    ///
    /// Any transport error or non-2xx status is a failure, whatever the body
    /// says.
    pub async fn ask(&self, query: &str) -> ReplyOutcome {
        let response = match self
            .http
            .post(&self.chat_url)
            .json(&ChatRequest::text(query))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ReplyOutcome::Failure(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return ReplyOutcome::Failure(format!("proxy responded with status {status}"));
        }

        match response.json::<Value>().await {
            Ok(body) => ReplyOutcome::Success(body),
            Err(e) => ReplyOutcome::Failure(e.to_string()),
        }
    }

    /// Send `query` in the background, delivering the outcome on `replies`
    pub fn spawn(&self, query: OutboundQuery, replies: mpsc::UnboundedSender<ReplyEvent>) {
        let client = self.clone();
        tokio::spawn(async move {
            let outcome = client.ask(&query.query).await;
            if let ReplyOutcome::Failure(ref reason) = outcome {
                tracing::warn!(token = %query.token, reason = %reason, "Chat request failed");
            }
            // Receiver gone means the app is shutting down
            let _ = replies.send(ReplyEvent {
                token: query.token,
                outcome,
            });
        });
    }
}
