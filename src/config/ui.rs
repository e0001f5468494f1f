//! Terminal UI settings

use serde::Deserialize;

/// Terminal UI settings
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Redraw interval of the event loop in milliseconds
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_ms: 200 }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileUi {
    pub tick_ms: Option<u64>,
}

impl UiConfig {
    pub fn from_file(file: Option<FileUi>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            // A zero interval would spin the event loop
            tick_ms: file.tick_ms.filter(|&ms| ms > 0).unwrap_or(200),
        }
    }
}
