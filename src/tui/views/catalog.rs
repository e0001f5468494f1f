// Catalog view
//
// A filter line above a table of the visible rows. Column headers mark the
// active sort column with an arrow.

use super::{panel, render_pending};
use crate::screens::catalog::{Catalog, CatalogRow};
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render<T: CatalogRow>(f: &mut Frame, area: Rect, app: &App, catalog: &Catalog<T>) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_filter_line(f, chunks[0], app, catalog);

    let block = panel(app.route.title(), theme);
    if render_pending(f, chunks[1], block.clone(), theme, &catalog.rows) {
        return;
    }

    let visible = catalog.visible();
    let total = catalog.rows.ready().map_or(0, Vec::len);
    let title = if visible.len() == total {
        format!("{} ({})", app.route.title(), total)
    } else {
        format!("{} ({} of {})", app.route.title(), visible.len(), total)
    };

    let header = Row::new(header_cells::<T>(catalog)).style(theme.header_style());
    let max_cell = Breakpoint::from_width(area.width).max_cell_width();

    let rows: Vec<Row> = visible
        .iter()
        .map(|row| {
            Row::new(
                row.cells()
                    .into_iter()
                    .map(|c| Cell::from(truncate_to_width(&c, max_cell))),
            )
        })
        .collect();

    let widths = column_widths::<T>(&visible, max_cell);

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(title, theme))
        .style(Style::default().fg(theme.foreground))
        .row_highlight_style(theme.selected_style())
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(catalog.selected_index()));
    }
    f.render_stateful_widget(table, chunks[1], &mut state);

    if visible.is_empty() {
        let empty = if total == 0 {
            format!("No {}s yet. Press n to add one", T::NOUN)
        } else {
            "Nothing matches the filter".to_string()
        };
        let inner = Rect {
            x: chunks[1].x + 2,
            y: chunks[1].y + 2,
            width: chunks[1].width.saturating_sub(4),
            height: 1,
        };
        f.render_widget(Paragraph::new(empty).style(theme.muted_style()), inner);
    }
}

fn render_filter_line<T: CatalogRow>(f: &mut Frame, area: Rect, app: &App, catalog: &Catalog<T>) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(" / ", Style::default().fg(theme.key))];

    if app.filter_editing {
        spans.push(Span::styled(
            format!("{}▏", catalog.filter()),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ));
    } else if catalog.filter().is_empty() {
        spans.push(Span::styled("filter", theme.muted_style()));
    } else {
        spans.push(Span::styled(
            catalog.filter().to_string(),
            Style::default().fg(theme.foreground),
        ));
    }

    spans.push(Span::styled("   sort: ", theme.muted_style()));
    for (i, name) in T::SORT_COLUMNS.iter().enumerate() {
        let active = catalog.sort().is_some_and(|s| s.column == i);
        let style = if active {
            Style::default().fg(theme.highlight)
        } else {
            theme.muted_style()
        };
        spans.push(Span::styled(format!("{}:{} ", i + 1, name), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Headers with ▲/▼ on the sorted column
fn header_cells<T: CatalogRow>(catalog: &Catalog<T>) -> Vec<Cell<'static>> {
    let sorted = catalog
        .sort()
        .and_then(|s| T::SORT_COLUMNS.get(s.column).map(|name| (*name, s.ascending)));

    T::HEADERS
        .iter()
        .map(|header| {
            let arrow = match sorted {
                Some((name, ascending)) if header.eq_ignore_ascii_case(name) => {
                    if ascending {
                        " ▲"
                    } else {
                        " ▼"
                    }
                }
                _ => "",
            };
            Cell::from(format!("{}{}", header, arrow))
        })
        .collect()
}

/// Size each column to its widest cell, capped
fn column_widths<T: CatalogRow>(rows: &[&T], max_cell: usize) -> Vec<Constraint> {
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.len() + 2).collect();
    for row in rows {
        for (i, cell) in row.cells().iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(display_width(cell).min(max_cell));
            }
        }
    }
    widths
        .into_iter()
        .map(|w| Constraint::Length(w as u16 + 1))
        .collect()
}
