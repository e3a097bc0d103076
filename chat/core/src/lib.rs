//! Lanyard Core - Headless Chat Logic for the Lanyard Portfolio
//!
//! Everything the portfolio chat needs that is not a pixel or a socket:
//! the transcript model, the proxy's wire contract, upstream access, the
//! widget state machine, viewport rules and the scene description.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌─────────────────────────┐
//! │   Surface (TUI, ...) │        │   lanyard-proxy (axum)  │
//! │  ┌────────────────┐  │  POST  │  ┌───────────────────┐  │
//! │  │   ChatWidget   │──┼───────>│  │   ChatBackend     │──┼──> upstream /chat
//! │  │  (this crate)  │<─┼────────│  │   (this crate)    │  │
//! │  └────────────────┘  │  JSON  │  └───────────────────┘  │
//! │  SceneRenderer impl  │        │  CORS + error shaping   │
//! └──────────────────────┘        └─────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`messages`]: Transcript entries and their reveal state
//! - [`wire`]: Request/response bodies shared by proxy and client
//! - [`backend`]: Upstream chatbot abstraction (HTTP, canned)
//! - [`widget`]: Chat widget state machine and reveal scheduling
//! - [`layout`]: Viewport thresholds and derived layout flags
//! - [`scene`]: Declarative lanyard scene and the renderer capability
//! - [`config`]: TOML + environment configuration
//!
//! # No UI Dependencies
//!
//! This crate has no dependency on ratatui, crossterm or axum.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod layout;
pub mod messages;
pub mod scene;
pub mod widget;
pub mod wire;

pub use backend::{BackendError, BackendKind, CannedBackend, ChatBackend, HttpChatBackend};
pub use layout::{Layout, ViewportPolicy};
pub use messages::{Message, MessageId, Sender};
pub use scene::{SceneDescription, SceneRenderer};
pub use widget::{
    ChatWidget, OutboundQuery, ReplyOutcome, RequestToken, TurnPhase, WidgetConfig,
};
pub use wire::{ChatRequest, ErrorBody};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, LanyardConfig, LanyardToml,
};
