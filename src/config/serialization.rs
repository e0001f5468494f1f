//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the full config file, comments included
    pub fn to_toml(&self) -> String {
        format!(
            r#"# fleetdesk configuration

# Base URL of the fleet backend (FLEETDESK_BACKEND_URL overrides)
backend_url = {backend_url}

# Seconds before a backend request is abandoned, 0 waits indefinitely
request_timeout_secs = {timeout}

# Theme: default, dracula, nord, gruvbox, monokai
theme = {theme}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# File logging (in addition to the logs panel or stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}

# Terminal UI
[ui]
tick_ms = {tick_ms}
"#,
            backend_url = quoted(&self.backend_url),
            timeout = self.request_timeout_secs,
            theme = quoted(&self.theme),
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = quoted(self.logging.file_rotation.as_str()),
            log_file_prefix = quoted(&self.logging.file_prefix),
            tick_ms = self.ui.tick_ms,
        )
    }
}

/// A TOML string literal, escaped as needed
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
