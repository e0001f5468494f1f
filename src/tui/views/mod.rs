// Views module - screen-level rendering logic
//
// Every route renders into the content area between the title bar and the
// logs panel. This module builds that shell and dispatches on the mounted
// screen state.

mod assignment;
mod car_detail;
mod catalog;
mod form;
mod history;
mod mileage;
mod modal;

use super::app::{App, ScreenState};
use crate::api::ApiError;
use crate::screens::Loadable;
use crate::theme::Theme;
use crate::tui::components;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Height of the logs panel including borders
const LOGS_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    // Small terminals give the logs panel up to the content
    let logs_height = if f.area().height < 24 { 0 } else { LOGS_HEIGHT };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(logs_height),
            Constraint::Length(2),
        ])
        .split(f.area());

    components::title_bar::render(f, chunks[0], app);

    match &app.screen {
        ScreenState::Cars(c) => catalog::render(f, chunks[1], app, c),
        ScreenState::Parts(c) => catalog::render(f, chunks[1], app, c),
        ScreenState::PartTypes(c) => catalog::render(f, chunks[1], app, c),
        ScreenState::Events(c) => catalog::render(f, chunks[1], app, c),
        ScreenState::Mileage(m) => mileage::render(f, chunks[1], app, m),
        ScreenState::Edit(e) => form::render(f, chunks[1], app, e),
        ScreenState::History(h) => history::render(f, chunks[1], app, h),
        ScreenState::CarDetail(d) => car_detail::render(f, chunks[1], app, d),
        ScreenState::Assignment(a) => assignment::render(f, chunks[1], app, a),
    }

    if logs_height > 0 {
        components::logs_panel::render(f, chunks[2], app);
    }
    components::status_bar::render(f, chunks[3], app);

    // Modal overlay on top of everything
    if let Some(modal_state) = &app.modal {
        modal::render(f, modal_state, app);
    }

    // Toast on top of the modal too
    if let Some(ref toast) = app.toast {
        toast.render(f, f.area(), &app.theme);
    }

    app.clear_expired_toast();
}

/// Bordered block in the current theme
pub(super) fn panel<'a>(title: impl Into<String>, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" {} ", title.into()))
}

/// Placeholder text while a resource is loading or after it failed
///
/// Returns `true` when something was drawn and the caller should stop.
pub(super) fn render_pending<T>(
    f: &mut Frame,
    area: Rect,
    block: Block,
    theme: &Theme,
    state: &Loadable<T>,
) -> bool {
    let (text, style) = match state {
        Loadable::Ready(_) => return false,
        Loadable::Loading => ("Loading…".to_string(), theme.muted_style()),
        Loadable::Failed(err) => (failure_text(err), Style::default().fg(theme.error)),
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
    true
}

fn failure_text(err: &ApiError) -> String {
    format!("{}\n\nPress r to retry, Esc to go back", err.user_message())
}
