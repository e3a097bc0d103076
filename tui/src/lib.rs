//! Lanyard TUI
//!
//! Terminal surface for the lanyard portfolio: the hanging ID card on one
//! side, the chat overlay on the other (or instead of it on narrow screens).
//!
//! # Architecture
//!
//! - **App**: event loop, key handling, reply channel
//! - **Card**: ratatui rendition of the lanyard scene
//! - **View**: chat overlay, landing actions, status line
//! - **Proxy client**: background `POST /api/chat` requests

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod card;
pub mod proxy_client;
pub mod theme;
pub mod view;

pub use app::App;
pub use card::CardRenderer;
pub use proxy_client::{ProxyClient, ReplyEvent};
