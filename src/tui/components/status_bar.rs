// Status bar component
//
// Renders the backend URL, current screen, in-flight requests and the keys
// that matter on this screen.

use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the status bar
///
/// Narrow terminals drop the key hints and shorten the backend URL.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let bp = Breakpoint::from_width(area.width);
    let in_flight = app.runner.in_flight();

    let status_text = if !bp.at_least(Breakpoint::Normal) {
        format!(" {} │ ⇅ {}", app.route.title(), in_flight)
    } else {
        let backend = truncate_to_width(app.runner.base_url(), 32);
        let base = format!(
            " {} │ {} │ ⇅ {} │ {}",
            backend,
            app.route.title(),
            in_flight,
            app.uptime()
        );
        if bp.at_least(Breakpoint::Wide) {
            format!("{} │ {}", base, app.key_hints())
        } else {
            base
        }
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}
