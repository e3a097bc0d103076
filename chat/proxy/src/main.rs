//! Lanyard Proxy Binary
//!
//! # Usage
//!
//! ```bash
//! # Defaults (127.0.0.1:3000, hosted chatbot upstream)
//! lanyard-proxy
//!
//! # Local chatbot, listen on all interfaces
//! lanyard-proxy --bind 0.0.0.0:8080 --upstream http://localhost:5000
//!
//! # No upstream at all, canned replies
//! lanyard-proxy --offline
//!
//! # Also forward /api/* to the upstream host
//! lanyard-proxy --dev-passthrough
//!
//! # Verbose logging
//! RUST_LOG=debug lanyard-proxy
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lanyard_core::{load_config, load_config_from_path, BackendKind, ConfigOverrides};
use lanyard_proxy::{bind, serve, shutdown_signal, ProxyState};

/// CORS chat proxy for the lanyard portfolio
#[derive(Parser, Debug)]
#[command(name = "lanyard-proxy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address
    #[arg(short = 'b', long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Upstream chatbot base URL
    #[arg(short = 'u', long, value_name = "URL")]
    upstream: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS")]
    upstream_timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "LANYARD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Answer with canned replies instead of calling the upstream
    #[arg(long)]
    offline: bool,

    /// Forward other /api/* paths to the upstream host
    #[arg(long)]
    dev_passthrough: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LANYARD_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(bind) = self.bind {
            overrides = overrides.with_bind(bind);
        }
        if let Some(ref upstream) = self.upstream {
            overrides = overrides.with_upstream_url(upstream.clone());
        }
        if let Some(secs) = self.upstream_timeout {
            overrides = overrides.with_upstream_timeout_secs(secs);
        }
        if self.offline {
            overrides = overrides.with_backend(BackendKind::Canned);
        }
        if self.dev_passthrough {
            overrides = overrides.with_dev_passthrough(true);
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lanyard_proxy={level},lanyard_core={level},tower_http={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match args.config {
        Some(ref path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        source = %config.source(),
        upstream = %config.upstream_url,
        backend = %config.backend,
        "Starting lanyard proxy"
    );

    let state = ProxyState::from_config(&config).context("Failed to set up backend")?;
    let listener = bind(config.bind).await?;
    serve(listener, state, shutdown_signal()).await
}
