// History view: a table of changes, newest first as the backend sends them

use super::{panel, render_pending};
use crate::screens::history::HistoryView;
use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App, view: &HistoryView) {
    let theme = &app.theme;
    let block = panel(app.route.title(), theme);
    if render_pending(f, area, block.clone(), theme, &view.records) {
        return;
    }

    let rows = view.rows();
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("  No changes recorded")
                .style(theme.muted_style())
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(["When", "Field", "Old", "New"]).style(theme.header_style());
    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.timestamp.clone()),
                Cell::from(row.field.clone()),
                Cell::from(truncate_to_width(&row.old_value, 30))
                    .style(Style::default().fg(theme.muted)),
                Cell::from(truncate_to_width(&row.new_value, 30)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .style(Style::default().fg(theme.foreground))
        .block(block.title_bottom(" c clear · y copy ".to_string()));
    f.render_widget(table, area);
}
