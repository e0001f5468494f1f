// CLI module - command-line argument parsing and handlers
//
// Provides:
// - --backend <url>: override the backend for this run
// - config --show|--reset|--edit|--path: configuration management
// - ping: check the backend answers without starting the TUI

use crate::api::{ApiError, FleetClient};
use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// fleetdesk - terminal console for a vehicle fleet backend
#[derive(Parser)]
#[command(name = "fleetdesk")]
#[command(version = VERSION)]
#[command(about = "Track vehicles, parts, events and mileage", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides FLEETDESK_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
    /// Check that the backend is reachable and list record counts
    Ping,
}

/// What `main` should do after argument parsing
pub enum CliAction {
    /// A config command ran; exit
    Done,
    /// Check the backend and exit
    Ping { backend: Option<String> },
    /// Start the console
    Run { backend: Option<String> },
}

/// Parse arguments and run the synchronous subcommands
pub fn handle_cli() -> CliAction {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            path,
        }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show(cli.backend);
            } else if reset {
                handle_config_reset();
            } else if edit {
                handle_config_edit();
            } else {
                println!("Usage: fleetdesk config [--show|--reset|--edit|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --path    Show config file path");
            }
            CliAction::Done
        }
        Some(Commands::Ping) => CliAction::Ping {
            backend: cli.backend,
        },
        None => CliAction::Run {
            backend: cli.backend,
        },
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show(backend: Option<String>) {
    let mut config = Config::from_env();
    if let Some(url) = backend {
        config.backend_url = url;
    }

    println!("# Effective configuration (flag > env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!("# TUI enabled: {}", config.enable_tui);

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ping
// ─────────────────────────────────────────────────────────────────────────────

/// Result of listing each collection once
pub struct PingReport {
    pub checks: Vec<(&'static str, Result<usize, ApiError>)>,
}

impl PingReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|(_, result)| result.is_ok())
    }
}

/// List all four collections concurrently
pub async fn ping(client: &FleetClient) -> PingReport {
    let (cars, parts, part_types, events) = futures::join!(
        client.list_cars(),
        client.list_parts(),
        client.list_part_types(),
        client.list_events(),
    );

    PingReport {
        checks: vec![
            ("vehicles", cars.map(|v| v.len())),
            ("parts", parts.map(|v| v.len())),
            ("part types", part_types.map(|v| v.len())),
            ("events", events.map(|v| v.len())),
        ],
    }
}

pub fn print_ping(base_url: &str, report: &PingReport) {
    println!("Backend: {}", base_url);
    for (name, result) in &report.checks {
        match result {
            Ok(count) => println!("  ✓ {:<12} {}", name, count),
            Err(err) => println!("  ✗ {:<12} {} ({})", name, err.user_message(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_list(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn ping_counts_every_collection() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            "/get-cars",
            json!({"cars": [{"id": 1, "chassis_number": "BMW-1"}]}),
        )
        .await;
        mount_list(&server, "/get-parts", json!({"parts": []})).await;
        mount_list(&server, "/get-part-types", json!({"part_types": []})).await;
        mount_list(&server, "/get-events", json!({"events": []})).await;

        let client = FleetClient::new(&server.uri(), None).unwrap();
        let report = ping(&client).await;

        assert!(report.is_ok());
        assert!(matches!(report.checks[0], ("vehicles", Ok(1))));
    }

    #[tokio::test]
    async fn ping_reports_failing_endpoint() {
        let server = MockServer::start().await;
        mount_list(&server, "/get-cars", json!({"cars": []})).await;
        mount_list(&server, "/get-parts", json!({"parts": []})).await;
        mount_list(&server, "/get-part-types", json!({"part_types": []})).await;
        Mock::given(method("GET"))
            .and(path("/get-events"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
            .mount(&server)
            .await;

        let client = FleetClient::new(&server.uri(), None).unwrap();
        let report = ping(&client).await;

        assert!(!report.is_ok());
        assert!(report.checks[3].1.is_err());
    }
}
