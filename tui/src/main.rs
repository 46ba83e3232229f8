//! Tracevis TUI Entry Point
//!
//! Usage:
//!   tracevis-tui [OPTIONS] [FILES]...
//!
//! Options:
//!   --config <PATH>      Config file (default: ~/.config/tracevis/tracevis.toml)
//!   --settings <PATH>    Settings store for color and style edits
//!   --frame-rate <N>     Frames per second (1-240)
//!   --log-file <PATH>    Also write diagnostics to a file

use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tracevis_core::config::{default_config_path, load_config_from_path};
use tracevis_core::{ConfigOverrides, LogCollector, Logger, SharedPalette};
use tracevis_tui::{App, LogCollectorLayer};

#[derive(Debug, Parser)]
#[command(name = "tracevis-tui", version, about = "Terminal trace viewer")]
struct Cli {
    /// Trace files to scan in the background
    files: Vec<PathBuf>,

    /// Config file
    #[arg(long, env = "TRACEVIS_CONFIG")]
    config: Option<PathBuf>,

    /// Settings store for color and style edits
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frames per second
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Also write diagnostics to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref path) = self.settings {
            overrides = overrides.with_settings_path(path.clone());
        }
        if let Some(rate) = self.frame_rate {
            overrides = overrides.with_frame_rate(rate);
        }
        overrides
    }
}

fn init_tracing(cli: &Cli, logger: Logger, palette: SharedPalette) -> anyhow::Result<()> {
    let file_layer = match cli.log_file {
        Some(ref path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(LogCollectorLayer::new(logger).with_palette(palette))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // This thread drives frames, so it owns the log
    let log = LogCollector::init();
    let palette = SharedPalette::default();
    init_tracing(&cli, log.logger(), palette.clone())?;

    let mut config = load_config_from_path(cli.config.clone().or_else(default_config_path))?;
    cli.overrides().apply(&mut config)?;
    tracing::info!(
        source = %config.source(),
        frame_rate = config.frame_rate,
        "Configuration loaded"
    );

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: tracevis-tui requires a terminal (TTY)");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::with_palette(config, log, cli.files, palette);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown().context("Failed to save settings")?;

    result
}
