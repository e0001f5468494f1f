// Title bar component
//
// Renders the app name, the current screen and a loading indicator.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Render the title bar at the top of the screen
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let loading = if app.runner.in_flight() > 0 {
        let frame = (app.elapsed_ms() / 250) as usize % SPINNER.len();
        format!(" {} loading", SPINNER[frame])
    } else {
        String::new()
    };

    let title_text = format!(" fleetdesk ──── {}{}", app.route.title(), loading);

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(" ? ").right_aligned()),
        );

    f.render_widget(title, area);
}
