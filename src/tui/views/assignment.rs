// Event assignment view: every vehicle, marked when already attached

use super::{panel, render_pending};
use crate::screens::assignment::Assignment;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App, screen: &Assignment) {
    let theme = &app.theme;

    let title = match screen.event.ready() {
        Some(event) => format!("{} · {}", event.name, event.date),
        None => app.route.title(),
    };
    let block = panel(title, theme);
    if render_pending(f, area, block.clone(), theme, &screen.event)
        || render_pending(f, area, block.clone(), theme, &screen.cars)
    {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let cars = screen.cars.ready().map(Vec::as_slice).unwrap_or(&[]);
    let items: Vec<ListItem> = cars
        .iter()
        .map(|car| {
            let attached = screen.is_attached(car.id);
            let selected = screen.selected() == Some(car.id);
            let mark = match (selected, attached) {
                (true, _) => Span::styled("[•] ", Style::default().fg(theme.highlight)),
                (false, true) => Span::styled("[✓] ", Style::default().fg(theme.success)),
                (false, false) => Span::styled("[ ] ", theme.muted_style()),
            };
            let name_style = if attached {
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            };
            ListItem::new(Line::from(vec![
                mark,
                Span::styled(car.chassis_number.clone(), name_style),
                Span::styled(
                    car.driver
                        .as_ref()
                        .map(|d| format!("  {}", d))
                        .unwrap_or_default(),
                    theme.muted_style(),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(screen.cursor()));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let footer = match screen.error() {
        Some(err) => Span::styled(format!(" ✗ {}", err), Style::default().fg(theme.error)),
        None => Span::styled(
            " [✓] attached · Space select · a attach · x detach",
            theme.muted_style(),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
}
