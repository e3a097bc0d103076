//! Upstream Chatbot Access
//!
//! The proxy and the offline demo mode both answer a query through the
//! [`ChatBackend`] trait, so the request handler never cares where the reply
//! comes from.
//!
//! # Available Backends
//!
//! - **HTTP**: the remote chatbot service (`POST {base}/chat`), the default
//! - **Canned**: random replies from a fixed list, for offline demos
//!
//! # Usage
//!
//! ```ignore
//! use lanyard_core::backend::{ChatBackend, HttpChatBackend};
//!
//! let backend = HttpChatBackend::new("https://chatbot.example.com", None)?;
//! let body = backend.ask(&ChatRequest::text("pricing")).await?;
//! ```

mod canned;
mod http;
mod traits;

pub use canned::{CannedBackend, CANNED_REPLIES};
pub use http::HttpChatBackend;
pub use traits::{BackendError, BackendKind, ChatBackend};
