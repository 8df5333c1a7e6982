//! Cyber Brain Dashboard - actor-based terminal client
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - pure reducer processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use cyberbrain_tui::cli;
use cyberbrain_tui::config::{Config, Overrides};
use cyberbrain_tui::messages::ui_events::key_to_ui_event;
use cyberbrain_tui::ui::draw_ui;
use cyberbrain_tui::{AppActor, HttpApi, NetworkActor, NetworkCommand, NetworkResponse, RecordId, RenderState, UiEvent};

#[derive(Parser)]
#[command(name = "cyberbrain")]
#[command(version, about = "Terminal dashboard for security threats and automated responses", long_about = None)]
struct Cli {
    /// Backend base URL (default: http://localhost:5000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log file path
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every threat with its matched action
    Threats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Explain the action taken for one threat, or for all of them
    Explain {
        /// Threat id (numeric or string)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        threat_id: Option<String>,

        /// Explain every threat with a recorded action in one batch request
        #[arg(long)]
        all: bool,
    },
    /// Print aggregate statistics
    Stats,
    /// Check backend health
    Health,
}

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = Config::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(Overrides {
            api_url: args.api_url,
            timeout_secs: args.timeout,
            log_file: args.log_file,
        })?;

    // Log to file; the terminal belongs to the dashboard
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_name = config
        .log_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(cyberbrain_tui::constants::DEFAULT_LOG_FILE));
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(api_url = %config.api_url, timeout = config.timeout_secs, "Starting");
    let api = HttpApi::from_config(&config);

    let output = match args.command {
        None => return run_dashboard(api).await,
        Some(Commands::Threats { json }) => cli::threats_report(&api, json).await?,
        Some(Commands::Explain { threat_id: Some(threat_id), .. }) => {
            cli::explain_threat(&api, &RecordId::parse(&threat_id)).await?
        }
        Some(Commands::Explain { threat_id: None, .. }) => cli::explain_all(&api).await?,
        Some(Commands::Stats) => cli::stats_report(&api).await?,
        Some(Commands::Health) => cli::health_report(&api).await?,
    };
    print!("{}", output);
    Ok(())
}

/// Wire the actors together and run the interactive dashboard
async fn run_dashboard(api: HttpApi) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(api, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.show_help, current_state.show_stats) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}
