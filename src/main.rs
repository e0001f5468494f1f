// fleetdesk - terminal console for a vehicle fleet backend
//
// Browses and edits vehicles, parts, part types and events over the backend's
// JSON API, records driven mileage, and shows per-record change history.
//
// Architecture:
// - API client (reqwest): one typed call per backend endpoint
// - Screens: plain state machines that ask for requests and absorb outcomes
// - Task runner (tokio): runs requests, drops results of screens left behind
// - TUI (ratatui): renders the mounted screen and routes keys to it

mod api;
mod cli;
mod config;
mod logging;
mod screens;
mod startup;
mod theme;
mod tui;
mod util;

use anyhow::Result;
use api::FleetClient;
use cli::CliAction;
use config::{Config, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --edit, --path)
    let (backend, ping_only) = match cli::handle_cli() {
        CliAction::Done => return Ok(()),
        CliAction::Ping { backend } => (backend, true),
        CliAction::Run { backend } => (backend, false),
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if let Some(url) = backend {
        config.backend_url = url.trim_end_matches('/').to_string();
    }
    if ping_only {
        config.enable_tui = false;
    }

    let log_buffer = LogBuffer::new();

    // The guard must outlive the program so buffered file logs are flushed
    let _file_guard = init_logging(&config, &log_buffer);

    let client = FleetClient::new(&config.backend_url, config.request_timeout())?;

    if !config.enable_tui {
        // Headless: check the backend once and report
        let report = cli::ping(&client).await;
        cli::print_ping(client.base_url(), &report);
        if !report.is_ok() {
            anyhow::bail!("backend at {} is not healthy", client.base_url());
        }
        return Ok(());
    }

    startup::print_startup(&config);
    startup::log_startup(&config);

    tui::run_tui(client, log_buffer, config).await
}

/// Initialize tracing with conditional output
///
/// In TUI mode logs go to the in-memory buffer (the logs panel) so they do
/// not garble the display; headless they go to stdout. File logging adds a
/// rotating JSON file on top of either.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_logging(config: &Config, log_buffer: &LogBuffer) -> Option<WorkerGuard> {
    let default_filter = format!("fleetdesk={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let (file_layer, guard) = if config.logging.file_enabled {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Daily => tracing_appender::rolling::daily(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Never => tracing_appender::rolling::never(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                };

                // Writes happen on a background thread
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let (tui_layer, stdout_layer) = if config.enable_tui {
        (Some(TuiLogLayer::new(log_buffer.clone())), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
