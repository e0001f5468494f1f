// Vehicle detail view
//
// Summary line, then installed parts with a wear column, then attended events.

use super::{panel, render_pending};
use crate::screens::car_detail::CarDetail;
use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App, detail: &CarDetail) {
    let theme = &app.theme;

    if let Some(message) = detail.missing_message() {
        f.render_widget(
            Paragraph::new(format!("\n  {}\n\n  Esc to go back", message))
                .style(Style::default().fg(theme.error))
                .block(panel(app.route.title(), theme)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(7),
        ])
        .split(area);

    render_summary(f, chunks[0], app, detail);
    render_parts(f, chunks[1], app, detail);
    render_events(f, chunks[2], app, detail);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App, detail: &CarDetail) {
    let theme = &app.theme;
    let block = panel(app.route.title(), theme);
    if render_pending(f, area, block.clone(), theme, &detail.car) {
        return;
    }
    let Some(car) = detail.car.ready() else {
        return;
    };

    let worn = detail.worn_out_count();
    let worn_span = if worn > 0 {
        Span::styled(
            format!("   {} worn out", worn),
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("")
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" Chassis ", theme.muted_style()),
            Span::styled(
                car.chassis_number.clone(),
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ),
            worn_span,
        ]),
        Line::from(vec![
            Span::styled(" Driver  ", theme.muted_style()),
            Span::raw(car.driver.clone().unwrap_or_else(|| "-".to_string())),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(theme.foreground))
            .block(block),
        area,
    );
}

fn render_parts(f: &mut Frame, area: Rect, app: &App, detail: &CarDetail) {
    let theme = &app.theme;
    let block = panel("Parts", theme);
    if render_pending(f, area, block.clone(), theme, &detail.parts) {
        return;
    }
    let parts = detail.parts.ready().map(Vec::as_slice).unwrap_or(&[]);
    if parts.is_empty() {
        f.render_widget(
            Paragraph::new("  No parts installed")
                .style(theme.muted_style())
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(["Name", "Part no.", "Type", "Mileage", "Max", "Wear"])
        .style(theme.header_style());
    let rows: Vec<Row> = parts
        .iter()
        .map(|part| {
            let wear = part.wear_percent();
            let wear_cell = match wear {
                Some(pct) => Cell::from(format!("{:.0}%", pct))
                    .style(Style::default().fg(theme.wear_color(pct))),
                None => Cell::from("-").style(theme.muted_style()),
            };
            let row = Row::new(vec![
                Cell::from(truncate_to_width(&part.name, 24)),
                Cell::from(part.part_number.clone()),
                Cell::from(part.part_type_name.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(part.mileage.to_string()),
                Cell::from(
                    part.max_mileage
                        .map_or_else(|| "-".to_string(), |m| m.to_string()),
                ),
                wear_cell,
            ]);
            if CarDetail::is_worn_out(part) {
                row.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(theme.foreground))
        .row_highlight_style(theme.selected_style())
        .highlight_symbol("▸ ")
        .block(block);

    let mut state = TableState::default().with_selected(Some(detail.part_cursor()));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_events(f: &mut Frame, area: Rect, app: &App, detail: &CarDetail) {
    let theme = &app.theme;
    let block = panel("Events", theme);
    if render_pending(f, area, block.clone(), theme, &detail.events) {
        return;
    }
    let events = detail.events.ready().map(Vec::as_slice).unwrap_or(&[]);

    let items: Vec<ListItem> = if events.is_empty() {
        vec![ListItem::new("  No events").style(theme.muted_style())]
    } else {
        events
            .iter()
            .map(|event| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", event.date), theme.muted_style()),
                    Span::raw(event.name.clone()),
                ]))
            })
            .collect()
    };

    f.render_widget(
        List::new(items)
            .style(Style::default().fg(theme.foreground))
            .block(block),
        area,
    );
}
