//! TOML Configuration File Support
//!
//! Centralized configuration for the proxy and the chat surface, read from
//! `~/.config/lanyard/lanyard.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/lanyard/lanyard.toml` (typically `~/.config/lanyard/lanyard.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [proxy]
//! bind = "0.0.0.0:8080"
//! upstream_url = "https://chatbot.example.com"
//! upstream_timeout_secs = 20
//! backend = "http"
//! dev_passthrough = false
//!
//! [chat]
//! owner = "JC"
//! proxy_url = "http://127.0.0.1:8080"
//! reveal_delay_ms = 30
//! portfolio_url = "/portfolio"
//!
//! [layout]
//! mobile_max_width = 768
//! small_max_width = 1024
//! cell_width_px = 8
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendKind;
use crate::layout::{ViewportPolicy, DEFAULT_MOBILE_MAX_WIDTH, DEFAULT_SMALL_MAX_WIDTH};
use crate::widget::{WidgetConfig, DEFAULT_REVEAL_DELAY};

/// Default proxy listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default upstream chatbot service
pub const DEFAULT_UPSTREAM_URL: &str = "https://jay-chatbot-4.onrender.com";

/// Default proxy address the chat surface talks to
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";

/// Default portfolio page
pub const DEFAULT_PORTFOLIO_URL: &str = "/portfolio";

/// Assumed pixel width of one terminal column
pub const DEFAULT_CELL_WIDTH_PX: u32 = 8;

/// How long the chat surface waits for one proxy reply
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[proxy]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyToml {
    /// Listen address
    pub bind: Option<String>,

    /// Base URL of the upstream chatbot service
    pub upstream_url: Option<String>,

    /// Upstream request timeout in seconds (absent = no timeout)
    pub upstream_timeout_secs: Option<u64>,

    /// Which backend answers queries
    pub backend: Option<BackendKind>,

    /// Forward other `/api/*` paths to the upstream host
    pub dev_passthrough: Option<bool>,
}

/// `[chat]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Name the agent speaks for
    pub owner: Option<String>,

    /// Where the chat surface sends queries
    pub proxy_url: Option<String>,

    /// Delay between revealed characters in milliseconds
    pub reveal_delay_ms: Option<u64>,

    /// Target of the "View Portfolio" action
    pub portfolio_url: Option<String>,

    /// Chat surface request timeout in seconds, 0 disables it
    pub request_timeout_secs: Option<u64>,
}

/// `[layout]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutToml {
    /// Widths at or below this are mobile
    pub mobile_max_width: Option<u32>,

    /// Widths below this are small
    pub small_max_width: Option<u32>,

    /// Pixel width of one terminal column
    pub cell_width_px: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanyardToml {
    /// Proxy section
    pub proxy: ProxyToml,

    /// Chat section
    pub chat: ChatToml,

    /// Layout section
    pub layout: LayoutToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration
///
/// Use [`load_config`] to build one with proper priority handling.
#[derive(Clone, Debug)]
pub struct LanyardConfig {
    /// Proxy listen address
    pub bind: SocketAddr,

    /// Upstream chatbot base URL
    pub upstream_url: String,

    /// Upstream request timeout, `None` for no timeout
    pub upstream_timeout: Option<Duration>,

    /// Backend answering queries
    pub backend: BackendKind,

    /// Whether dev passthrough routes are mounted
    pub dev_passthrough: bool,

    /// Name the agent speaks for
    pub owner: String,

    /// Where the chat surface sends queries
    pub proxy_url: String,

    /// Delay between revealed characters
    pub reveal_delay: Duration,

    /// Target of the "View Portfolio" action
    pub portfolio_url: String,

    /// How long the chat surface waits for the proxy, `None` for no limit
    pub request_timeout: Option<Duration>,

    /// Layout thresholds
    pub viewport: ViewportPolicy,

    /// Pixel width of one terminal column
    pub cell_width_px: u32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for LanyardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: None,
            backend: BackendKind::Http,
            dev_passthrough: false,
            owner: "JC".to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
            portfolio_url: DEFAULT_PORTFOLIO_URL.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            viewport: ViewportPolicy {
                mobile_max_width: DEFAULT_MOBILE_MAX_WIDTH,
                small_max_width: DEFAULT_SMALL_MAX_WIDTH,
            },
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl LanyardConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Widget settings derived from this configuration
    #[must_use]
    pub fn widget(&self) -> WidgetConfig {
        WidgetConfig {
            owner: self.owner.clone(),
            reveal_delay: self.reveal_delay,
            viewport: self.viewport,
        }
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.upstream_url) {
            return Err(ConfigError::ValidationError(format!(
                "upstream_url must start with http:// or https://, got '{}'",
                self.upstream_url
            )));
        }
        if !is_http_url(&self.proxy_url) {
            return Err(ConfigError::ValidationError(format!(
                "proxy_url must start with http:// or https://, got '{}'",
                self.proxy_url
            )));
        }
        if self.owner.trim().is_empty() {
            return Err(ConfigError::ValidationError("owner must not be empty".into()));
        }
        if self.viewport.mobile_max_width >= self.viewport.small_max_width {
            return Err(ConfigError::ValidationError(format!(
                "mobile_max_width ({}) must be below small_max_width ({})",
                self.viewport.mobile_max_width, self.viewport.small_max_width
            )));
        }
        if self.cell_width_px == 0 {
            return Err(ConfigError::ValidationError("cell_width_px must be positive".into()));
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn parse_bind(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("invalid bind address '{raw}': {e}")))
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lanyard/lanyard.toml` or
/// `~/.config/lanyard/lanyard.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lanyard").join("lanyard.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; callers apply [`ConfigOverrides`]
/// afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<LanyardConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if it holds an invalid bind address.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<LanyardConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration reading environment variables through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<LanyardConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = LanyardConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: LanyardToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut LanyardConfig, toml: &LanyardToml) -> Result<(), ConfigError> {
    // Proxy settings
    if let Some(ref bind) = toml.proxy.bind {
        config.bind = parse_bind(bind)?;
    }
    if let Some(ref url) = toml.proxy.upstream_url {
        config.upstream_url = url.clone();
    }
    if let Some(secs) = toml.proxy.upstream_timeout_secs {
        config.upstream_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(kind) = toml.proxy.backend {
        config.backend = kind;
    }
    if let Some(enabled) = toml.proxy.dev_passthrough {
        config.dev_passthrough = enabled;
    }

    // Chat settings
    if let Some(ref owner) = toml.chat.owner {
        config.owner = owner.clone();
    }
    if let Some(ref url) = toml.chat.proxy_url {
        config.proxy_url = url.clone();
    }
    if let Some(ms) = toml.chat.reveal_delay_ms {
        config.reveal_delay = Duration::from_millis(ms);
    }
    if let Some(ref url) = toml.chat.portfolio_url {
        config.portfolio_url = url.clone();
    }
    if let Some(secs) = toml.chat.request_timeout_secs {
        config.request_timeout = timeout_from_secs(secs);
    }

    // Layout settings
    if let Some(width) = toml.layout.mobile_max_width {
        config.viewport.mobile_max_width = width;
    }
    if let Some(width) = toml.layout.small_max_width {
        config.viewport.small_max_width = width;
    }
    if let Some(px) = toml.layout.cell_width_px {
        config.cell_width_px = px;
    }

    Ok(())
}

/// Apply environment variable overrides to the config
///
/// Unparseable values are skipped with a warning.
fn apply_env_config<F>(config: &mut LanyardConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = env("LANYARD_BIND") {
        match parse_bind(&bind) {
            Ok(addr) => {
                config.bind = addr;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring LANYARD_BIND"),
        }
    }
    if let Some(url) = env("LANYARD_UPSTREAM_URL") {
        config.upstream_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("LANYARD_UPSTREAM_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.upstream_timeout = Some(Duration::from_secs(secs));
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring LANYARD_UPSTREAM_TIMEOUT");
        }
    }
    if let Some(backend) = env("LANYARD_BACKEND") {
        match backend.parse::<BackendKind>() {
            Ok(kind) => {
                config.backend = kind;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring LANYARD_BACKEND"),
        }
    }
    if let Some(url) = env("LANYARD_PROXY_URL") {
        config.proxy_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(owner) = env("LANYARD_OWNER") {
        config.owner = owner;
        config.source = ConfigSource::Env;
    }
    if let Some(delay) = env("LANYARD_REVEAL_DELAY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.reveal_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %delay, "Ignoring LANYARD_REVEAL_DELAY_MS");
        }
    }
    if let Some(timeout) = env("LANYARD_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = timeout_from_secs(secs);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring LANYARD_REQUEST_TIMEOUT");
        }
    }
}

/// Zero seconds means no timeout
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Listen address override
    pub bind: Option<SocketAddr>,

    /// Upstream URL override
    pub upstream_url: Option<String>,

    /// Upstream timeout override (seconds)
    pub upstream_timeout_secs: Option<u64>,

    /// Backend override
    pub backend: Option<BackendKind>,

    /// Dev passthrough override
    pub dev_passthrough: Option<bool>,

    /// Proxy URL override
    pub proxy_url: Option<String>,

    /// Owner override
    pub owner: Option<String>,

    /// Chat surface request timeout override (seconds, 0 disables)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set listen address override
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = Some(bind);
        self
    }

    /// Set upstream URL override
    #[must_use]
    pub fn with_upstream_url(mut self, url: String) -> Self {
        self.upstream_url = Some(url);
        self
    }

    /// Set upstream timeout override
    #[must_use]
    pub fn with_upstream_timeout_secs(mut self, secs: u64) -> Self {
        self.upstream_timeout_secs = Some(secs);
        self
    }

    /// Set backend override
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set dev passthrough override
    #[must_use]
    pub fn with_dev_passthrough(mut self, enabled: bool) -> Self {
        self.dev_passthrough = Some(enabled);
        self
    }

    /// Set proxy URL override
    #[must_use]
    pub fn with_proxy_url(mut self, url: String) -> Self {
        self.proxy_url = Some(url);
        self
    }

    /// Set owner override
    #[must_use]
    pub fn with_owner(mut self, owner: String) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set chat surface request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    fn is_empty(&self) -> bool {
        self.bind.is_none()
            && self.upstream_url.is_none()
            && self.upstream_timeout_secs.is_none()
            && self.backend.is_none()
            && self.dev_passthrough.is_none()
            && self.proxy_url.is_none()
            && self.owner.is_none()
            && self.request_timeout_secs.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut LanyardConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(ref url) = self.upstream_url {
            config.upstream_url = url.clone();
        }
        if let Some(secs) = self.upstream_timeout_secs {
            config.upstream_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(kind) = self.backend {
            config.backend = kind;
        }
        if let Some(enabled) = self.dev_passthrough {
            config.dev_passthrough = enabled;
        }
        if let Some(ref url) = self.proxy_url {
            config.proxy_url = url.clone();
        }
        if let Some(ref owner) = self.owner {
            config.owner = owner.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = timeout_from_secs(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
