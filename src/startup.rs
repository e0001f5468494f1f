// Startup module - displays banner and effective settings
//
// Printed before the TUI takes over the screen (or in headless mode), and
// mirrored into the logs panel once the TUI is up.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Print the startup banner
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}fleetdesk{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Vehicles, parts, events and mileage{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }

    println!(
        "  {MAGENTA}▸{RESET} Backend {BOLD}{}{RESET}",
        config.backend_url
    );
    match config.request_timeout() {
        Some(timeout) => println!("  {DIM}Timeout: {}s{RESET}", timeout.as_secs()),
        None => println!("  {DIM}Timeout: none{RESET}"),
    }
    if config.logging.file_enabled {
        println!(
            "  {DIM}Log files: {}{RESET}",
            config.logging.file_dir.display()
        );
    }
    println!();
}

/// Startup summary for the logs panel
pub fn log_startup(config: &Config) {
    tracing::info!("fleetdesk v{}", VERSION);
    tracing::info!(
        backend = %config.backend_url,
        theme = %config.theme,
        timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );
    tracing::info!("Ready. Press ? for keys");
}
