//! Lanyard Proxy - CORS Chat Proxy
//!
//! A single HTTP endpoint, `/api/chat`, that lets the portfolio page talk to
//! the chatbot service without cross-origin trouble.
//!
//! # Contract
//!
//! | Request | Response |
//! |---------|----------|
//! | `OPTIONS /api/chat` | 200, empty body |
//! | `POST /api/chat` with truthy `query` | upstream JSON, 200 |
//! | `POST /api/chat` without it | 400 `{"error":"Query is required"}` |
//! | any other method | 405 `{"error":"Method not allowed"}` |
//! | upstream failure of any kind | 500 `{"error":..., "response":...}` |
//!
//! Every response, error or not, carries the three `Access-Control-*`
//! headers. The proxy keeps no state between requests.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod passthrough;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ProxyError;
pub use passthrough::Passthrough;
pub use routes::create_router;
pub use server::{bind, serve, shutdown_signal};
pub use state::ProxyState;
