//! Lanyard TUI Entry Point
//!
//! Usage:
//!   lanyard-tui [OPTIONS]
//!
//! Options:
//!   --proxy-url <URL>  Chat proxy base URL (env: LANYARD_PROXY_URL)
//!   --owner <NAME>     Name on the card and in the agent greeting
//!   --config <FILE>    Configuration file (env: LANYARD_CONFIG)
//!   --timeout <SECS>   Seconds to wait for each reply, 0 for no limit
//!
//! Shift+Enter needs a terminal with the kitty keyboard protocol; Alt+Enter
//! inserts a newline everywhere.

use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lanyard_core::{load_config, load_config_from_path, ConfigOverrides, LanyardConfig};
use lanyard_tui::App;

/// Terminal surface for the lanyard portfolio
#[derive(Parser, Debug)]
#[command(name = "lanyard-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat proxy base URL
    #[arg(short = 'p', long, env = "LANYARD_PROXY_URL", value_name = "URL")]
    proxy_url: Option<String>,

    /// Name on the card and in the agent greeting
    #[arg(short = 'o', long, value_name = "NAME")]
    owner: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "LANYARD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds to wait for each reply (0 for no limit)
    #[arg(short = 't', long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.proxy_url {
            overrides = overrides.with_proxy_url(url.clone());
        }
        if let Some(ref owner) = self.owner {
            overrides = overrides.with_owner(owner.clone());
        }
        if let Some(secs) = self.timeout {
            overrides = overrides.with_request_timeout_secs(secs);
        }
        overrides
    }
}

fn load(args: &Args) -> anyhow::Result<LanyardConfig> {
    let mut config = match args.config {
        Some(ref path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never land inside the alternate screen
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: lanyard-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    let config = load(&args)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // Lets Shift+Enter arrive as its own key where the terminal can report it
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &config).await;

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &LanyardConfig,
) -> anyhow::Result<()> {
    let size = crossterm::terminal::size()?;
    let mut app = App::new(config, size)?;
    app.run(terminal).await?;

    println!("\n\x1b[1m{}'s Agent:\x1b[0m Thanks for stopping by!\n", config.owner);

    Ok(())
}
