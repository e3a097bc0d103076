//! Chat Backend Traits
//!
//! Trait definitions for whatever answers a chat query. Implementations hide
//! transport details; callers only see a JSON body or a [`BackendError`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::wire::ChatRequest;

/// Ways an upstream call can fail
///
/// The proxy flattens all of these into one fixed error body; the variants
/// exist for the diagnostic log.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, TLS or timeout failure
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("API responded with status: {0}")]
    Status(u16),

    /// Upstream body was not valid JSON
    #[error("upstream returned malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The backend could not be constructed
    #[error("invalid backend configuration: {0}")]
    Config(String),
}

/// Something that can answer a chat query
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs (e.g., "http", "canned")
    fn name(&self) -> &str;

    /// Answer a query with the upstream's JSON body
    ///
    /// Exactly one attempt is made. No retry, no backoff.
    async fn ask(&self, request: &ChatRequest) -> Result<Value, BackendError>;
}

/// Which backend to run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote chatbot over HTTP
    #[default]
    Http,
    /// Canned offline replies
    Canned,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Canned => write!(f, "canned"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "upstream" => Ok(Self::Http),
            "canned" | "offline" | "demo" => Ok(Self::Canned),
            other => Err(BackendError::Config(format!("unknown backend '{other}'"))),
        }
    }
}
