// Theme support for the TUI
//
// Color palettes selected by name from the config file. "default" uses the
// terminal's ANSI palette, named themes use true color (RGB).

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Base
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_type: BorderType,

    // UI elements
    pub title: Color,
    pub highlight: Color,
    pub selection: Color,
    pub selection_fg: Color,
    pub status_bar: Color,
    pub key: Color,

    // Notices and wear levels
    pub success: Color,
    pub warn: Color,
    pub error: Color,
}

impl Theme {
    /// Load theme by name, unknown names fall back to the default palette
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::dracula(),
            "monokai" => Self::monokai(),
            "nord" => Self::nord(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::terminal(),
        }
    }

    /// Uses the terminal's ANSI palette
    pub fn terminal() -> Self {
        Self {
            name: "default".to_string(),
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::DarkGray,
            border: Color::Gray,
            border_type: BorderType::Plain,
            title: Color::Cyan,
            highlight: Color::Yellow,
            selection: Color::DarkGray,
            selection_fg: Color::White,
            status_bar: Color::Green,
            key: Color::Cyan,
            success: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Dracula theme - https://draculatheme.com
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            background: Color::Rgb(0x28, 0x2a, 0x36),
            foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
            muted: Color::Rgb(0x62, 0x72, 0xa4),        // comment
            border: Color::Rgb(0x62, 0x72, 0xa4),       // comment
            border_type: BorderType::Rounded,
            title: Color::Rgb(0x8b, 0xe9, 0xfd),        // cyan
            highlight: Color::Rgb(0xf1, 0xfa, 0x8c),    // yellow
            selection: Color::Rgb(0x44, 0x47, 0x5a),    // current line
            selection_fg: Color::Rgb(0xf8, 0xf8, 0xf2),
            status_bar: Color::Rgb(0x50, 0xfa, 0x7b),   // green
            key: Color::Rgb(0xbd, 0x93, 0xf9),          // purple
            success: Color::Rgb(0x50, 0xfa, 0x7b),
            warn: Color::Rgb(0xff, 0xb8, 0x6c),         // orange
            error: Color::Rgb(0xff, 0x55, 0x55),
        }
    }

    /// Monokai Pro theme
    pub fn monokai() -> Self {
        Self {
            name: "monokai".to_string(),
            background: Color::Rgb(0x27, 0x28, 0x22),
            foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
            muted: Color::Rgb(0x75, 0x71, 0x5e),
            border: Color::Rgb(0x75, 0x71, 0x5e),
            border_type: BorderType::Rounded,
            title: Color::Rgb(0x66, 0xd9, 0xef),        // blue
            highlight: Color::Rgb(0xe6, 0xdb, 0x74),    // yellow
            selection: Color::Rgb(0x49, 0x48, 0x3e),
            selection_fg: Color::Rgb(0xf8, 0xf8, 0xf2),
            status_bar: Color::Rgb(0xa6, 0xe2, 0x2e),   // green
            key: Color::Rgb(0xae, 0x81, 0xff),          // purple
            success: Color::Rgb(0xa6, 0xe2, 0x2e),
            warn: Color::Rgb(0xfd, 0x97, 0x1f),         // orange
            error: Color::Rgb(0xf9, 0x26, 0x72),        // pink/red
        }
    }

    /// Nord theme - https://nordtheme.com
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::Rgb(0x2e, 0x34, 0x40),
            foreground: Color::Rgb(0xd8, 0xde, 0xe9),   // snow storm
            muted: Color::Rgb(0x4c, 0x56, 0x6a),        // polar night
            border: Color::Rgb(0x4c, 0x56, 0x6a),
            border_type: BorderType::Plain,
            title: Color::Rgb(0x88, 0xc0, 0xd0),        // frost cyan
            highlight: Color::Rgb(0xeb, 0xcb, 0x8b),    // aurora yellow
            selection: Color::Rgb(0x43, 0x4c, 0x5e),
            selection_fg: Color::Rgb(0xec, 0xef, 0xf4),
            status_bar: Color::Rgb(0xa3, 0xbe, 0x8c),   // aurora green
            key: Color::Rgb(0x81, 0xa1, 0xc1),          // frost blue
            success: Color::Rgb(0xa3, 0xbe, 0x8c),
            warn: Color::Rgb(0xd0, 0x87, 0x70),         // aurora orange
            error: Color::Rgb(0xbf, 0x61, 0x6a),        // aurora red
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            background: Color::Rgb(0x28, 0x28, 0x28),
            foreground: Color::Rgb(0xeb, 0xdb, 0xb2),
            muted: Color::Rgb(0x92, 0x83, 0x74),        // gray
            border: Color::Rgb(0x66, 0x5c, 0x54),
            border_type: BorderType::Plain,
            title: Color::Rgb(0x83, 0xa5, 0x98),        // blue
            highlight: Color::Rgb(0xfa, 0xbd, 0x2f),    // yellow
            selection: Color::Rgb(0x50, 0x49, 0x45),
            selection_fg: Color::Rgb(0xfb, 0xf1, 0xc7),
            status_bar: Color::Rgb(0xb8, 0xbb, 0x26),   // green
            key: Color::Rgb(0xd3, 0x86, 0x9b),          // purple
            success: Color::Rgb(0xb8, 0xbb, 0x26),
            warn: Color::Rgb(0xfe, 0x80, 0x19),         // orange
            error: Color::Rgb(0xfb, 0x49, 0x34),        // red
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived styles
    // ─────────────────────────────────────────────────────────────────────────

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.title)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Color for a wear percentage: fine, getting close, worn out
    pub fn wear_color(&self, percent: f64) -> Color {
        if percent >= 100.0 {
            self.error
        } else if percent >= 80.0 {
            self.warn
        } else {
            self.success
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_default() {
        assert_eq!(Theme::by_name("solarized").name, "default");
        assert_eq!(Theme::by_name("Nord").name, "nord");
    }

    #[test]
    fn wear_color_thresholds() {
        let theme = Theme::terminal();
        assert_eq!(theme.wear_color(100.0), theme.error);
        assert_eq!(theme.wear_color(85.0), theme.warn);
        assert_eq!(theme.wear_color(10.0), theme.success);
    }
}
