// Add-mileage view
//
// Vehicle selector and delta field on top, then the vehicle's parts. Flagged
// parts take the common delta; unflagged parts show their own value.

use super::{panel, render_pending};
use crate::screens::mileage::{MileageFocus, MileageForm};
use crate::screens::Loadable;
use crate::tui::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App, form: &MileageForm) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    let block = panel(app.route.title(), theme);
    if render_pending(f, chunks[0], block.clone(), theme, &form.cars) {
        return;
    }

    let focus_style = |focused: bool| {
        if focused {
            theme.selected_style()
        } else {
            Style::default().fg(theme.foreground)
        }
    };

    let vehicle = form.selected_car_label().unwrap_or("choose with ←/→");
    let delta_focused = form.focus == MileageFocus::Delta;
    let delta = if delta_focused {
        format!("{}▏", form.delta())
    } else if form.delta().is_empty() {
        "-".to_string()
    } else {
        form.delta().to_string()
    };

    let header = vec![
        Line::from(vec![
            Span::styled(" Vehicle  ", theme.muted_style()),
            Span::styled(
                format!("◂ {} ▸", vehicle),
                focus_style(form.focus == MileageFocus::Vehicle),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Distance ", theme.muted_style()),
            Span::styled(delta, focus_style(delta_focused)),
        ]),
    ];
    f.render_widget(Paragraph::new(header).block(block), chunks[0]);

    render_parts(f, chunks[1], app, form);

    let footer = if form.is_submitting() {
        Span::styled(" Submitting…", theme.muted_style())
    } else if let Some(err) = form.error() {
        Span::styled(format!(" ✗ {}", err), Style::default().fg(theme.error))
    } else {
        Span::styled(
            " Space: use distance / own value · digits: own value · Enter: submit",
            theme.muted_style(),
        )
    };
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
}

fn render_parts(f: &mut Frame, area: Rect, app: &App, form: &MileageForm) {
    let theme = &app.theme;
    let focused = form.focus == MileageFocus::Parts;
    let mut block = panel("Parts", theme);
    if focused {
        block = block.border_style(Style::default().fg(theme.highlight));
    }

    let parts = match form.parts() {
        None => {
            f.render_widget(
                Paragraph::new("  Pick a vehicle first")
                    .style(theme.muted_style())
                    .block(block),
                area,
            );
            return;
        }
        Some(state) => state,
    };
    if render_pending(f, area, block.clone(), theme, parts) {
        return;
    }
    let Loadable::Ready(parts) = parts else {
        return;
    };
    if parts.is_empty() {
        f.render_widget(
            Paragraph::new("  This vehicle has no parts")
                .style(theme.muted_style())
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(["", "Name", "Current", "Max", "Added"]).style(theme.header_style());
    let rows: Vec<Row> = parts
        .iter()
        .map(|part| {
            let common = form.applies_common(part.id);
            let (flag, added) = if common {
                ("[x]", form.delta().to_string())
            } else {
                let own = form.override_text(part.id);
                ("[ ]", if own.is_empty() { "0".to_string() } else { own.to_string() })
            };
            let current = match part.wear_percent() {
                Some(pct) => Cell::from(part.mileage.to_string())
                    .style(Style::default().fg(theme.wear_color(pct))),
                None => Cell::from(part.mileage.to_string()),
            };
            let added_style = if common {
                theme.muted_style()
            } else {
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD)
            };
            Row::new(vec![
                Cell::from(flag),
                Cell::from(truncate_to_width(&part.name, 28)),
                current,
                Cell::from(
                    part.max_mileage
                        .map_or_else(|| "-".to_string(), |m| m.to_string()),
                ),
                Cell::from(added).style(added_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let mut table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(theme.foreground))
        .block(block);
    if focused {
        table = table
            .row_highlight_style(theme.selected_style())
            .highlight_symbol("▸ ");
    }

    let mut state = TableState::default().with_selected(Some(form.part_cursor()));
    f.render_stateful_widget(table, area, &mut state);
}
