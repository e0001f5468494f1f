// Create/edit form view
//
// One line per field: label, value, and a cursor on the focused field.
// Select fields show `◂ label ▸` so it is clear ←/→ cycle them.

use super::{panel, render_pending};
use crate::screens::form::FieldKind;
use crate::screens::forms::EditScreen;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const LABEL_WIDTH: usize = 16;

pub fn render(f: &mut Frame, area: Rect, app: &App, screen: &EditScreen) {
    let theme = &app.theme;
    let block = panel(app.route.title(), theme);

    // Editing waits for the record before the fields mean anything
    if screen.id.is_some() && render_pending(f, area, block.clone(), theme, &screen.entity) {
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let focused = screen.form.focused();
    let mut lines = vec![Line::raw("")];
    for (i, field) in screen.form.fields.iter().enumerate() {
        let is_focused = i == focused;
        let marker = if field.required { "*" } else { " " };
        let label_style = if is_focused {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };

        let value = field.display();
        let value_span = match (&field.kind, is_focused) {
            (FieldKind::Select(_), true) => {
                Span::styled(format!("◂ {} ▸", value), theme.selected_style())
            }
            (_, true) => Span::styled(format!("{}▏", value), theme.selected_style()),
            _ if value.is_empty() => Span::styled("-", theme.muted_style()),
            _ => Span::styled(value, Style::default().fg(theme.foreground)),
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {}", marker), Style::default().fg(theme.warn)),
            Span::styled(format!("{:<width$}", field.label, width = LABEL_WIDTH), label_style),
            value_span,
        ]));
    }

    f.render_widget(Paragraph::new(lines), chunks[0]);

    let footer = if screen.is_submitting() {
        Line::from(Span::styled("  Saving…", theme.muted_style()))
    } else if let Some(err) = screen.error() {
        Line::from(Span::styled(
            format!("  ✗ {}", err),
            Style::default().fg(theme.error),
        ))
    } else {
        Line::from(Span::styled(
            "  * required · Enter to save",
            theme.muted_style(),
        ))
    };
    f.render_widget(Paragraph::new(footer), chunks[1]);
}
