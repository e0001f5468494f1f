// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, finished backend requests)
// - Rendering the UI

pub mod app;
pub mod clipboard;
pub mod components;
pub mod input;
pub mod keys;
pub mod layout;
pub mod modal;
pub mod tasks;
pub mod views;

use crate::api::FleetClient;
use crate::config::Config;
use crate::logging::LogBuffer;
use crate::screens::Screen;
use crate::theme::Theme;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use keys::KeyAction;
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tasks::{Tagged, TaskRunner};
use tokio::sync::mpsc;

/// Finished requests waiting for the event loop
const RESULT_CHANNEL_CAPACITY: usize = 256;

/// Run the TUI
///
/// This function sets up the terminal, runs the event loop, and cleans up
/// when done.
pub async fn run_tui(client: FleetClient, log_buffer: LogBuffer, config: Config) -> Result<()> {
    // Set up terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (result_tx, mut result_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
    let runner = TaskRunner::new(client, result_tx);
    let mut app = App::new(runner, log_buffer, Theme::by_name(&config.theme));
    app.navigate(Screen::Home);

    let result = run_event_loop(&mut terminal, &mut app, &mut result_rx, config.tick_rate()).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// This loop handles three kinds of events:
/// 1. Keyboard input (for navigation and commands)
/// 2. Timer ticks (for redraws, toast expiry and the spinner)
/// 3. Finished backend requests (applied to the mounted screen)
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    result_rx: &mut mpsc::Receiver<Tagged>,
    tick_rate: Duration,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(tick_rate);

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            // Periodic tick for redrawing
            _ = tick_interval.tick() => {}

            // Backend results
            Some(tagged) = result_rx.recv() => {
                app.receive(tagged);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Modal → Global → Filter → Screen
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    // Layer 1: Modal captures all input when active
    if handle_modal_input(app, &key_event) {
        return;
    }

    match key_event.kind {
        KeyEventKind::Press => {}
        KeyEventKind::Release => {
            app.handle_key_release(key_event.code);
            return;
        }
        _ => return,
    }

    if !app.handle_key_press(key_event.code) {
        return;
    }

    // Layer 2: Global keys (work regardless of screen)
    if handle_global_keys(app, &key_event) {
        return;
    }

    // Layer 3: Catalog filter line
    if app.filter_editing {
        app.filter_editing = keys::filter_key(&mut app.screen, key_event.code);
        return;
    }

    // Layer 4: Screen keys
    if key_event.code == KeyCode::Esc {
        app.go_back();
        return;
    }

    match keys::handle(&mut app.screen, key_event) {
        KeyAction::None => {}
        KeyAction::Effects(effects) => app.apply_effects(effects),
        KeyAction::Modal(modal) => app.modal = Some(modal),
        KeyAction::Copy(text) => copy(app, &text),
        KeyAction::StartFilter => app.filter_editing = true,
        KeyAction::Refresh => app.navigate(app.route),
    }
}

fn copy(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    if clipboard::copy_to_clipboard(text).is_ok() {
        app.show_toast("✓ Copied to clipboard");
    } else {
        app.show_toast("✗ Failed to copy");
    }
}

/// Handle modal input - returns true if modal absorbed the input
fn handle_modal_input(app: &mut App, key_event: &KeyEvent) -> bool {
    let Some(ref modal) = app.modal else {
        return false;
    };

    // Always process Release events to keep the debouncer in sync,
    // otherwise keys stay "pressed" after the modal closes
    if key_event.kind == KeyEventKind::Release {
        app.handle_key_release(key_event.code);
        return true;
    }

    if key_event.kind != KeyEventKind::Press {
        return true;
    }

    if is_ctrl_c(key_event) {
        app.should_quit = true;
        return true;
    }

    match modal.handle_input(key_event.code) {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::Confirm(action) => {
            app.modal = None;
            app.confirm(action);
        }
    }

    true
}

fn is_ctrl_c(key_event: &KeyEvent) -> bool {
    key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
}

/// Handle global keys - returns true if handled
///
/// F-keys and Ctrl+C always work; letter shortcuts only outside text entry.
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    if is_ctrl_c(key_event) {
        app.should_quit = true;
        return true;
    }

    let letters = !app.text_entry();
    let target = match key_event.code {
        KeyCode::F(1) => Screen::Home,
        KeyCode::F(2) => Screen::Parts,
        KeyCode::F(3) => Screen::PartTypes,
        KeyCode::F(4) => Screen::Events,
        KeyCode::F(5) => Screen::Mileage,
        KeyCode::F(6) => {
            app.modal = Some(Modal::help());
            return true;
        }
        KeyCode::Char('h') if letters => Screen::Home,
        KeyCode::Char('p') if letters => Screen::Parts,
        KeyCode::Char('t') if letters => Screen::PartTypes,
        KeyCode::Char('e') if letters => Screen::Events,
        KeyCode::Char('m') if letters => Screen::Mileage,
        KeyCode::Char('?') if letters => {
            app.modal = Some(Modal::help());
            return true;
        }
        KeyCode::Char('q') if letters => {
            app.should_quit = true;
            return true;
        }
        _ => return false,
    };

    app.navigate(target);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FleetClient;
    use crate::screens::Loadable;
    use app::ScreenState;

    fn app() -> App {
        let (tx, _rx) = mpsc::channel(16);
        let client = FleetClient::new("http://127.0.0.1:9", None).unwrap();
        App::new(TaskRunner::new(client, tx), LogBuffer::new(), Theme::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
        // Pretend the terminal reports releases so repeated keys register
        handle_key_event(
            app,
            KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release),
        );
    }

    #[tokio::test]
    async fn letters_switch_screens_outside_forms() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.route, Screen::Parts);
        press(&mut app, KeyCode::F(5));
        assert_eq!(app.route, Screen::Mileage);
    }

    #[tokio::test]
    async fn letters_are_typed_inside_forms() {
        let mut app = app();
        app.navigate(Screen::PartTypeForm(None));
        for c in ['t', 'e', 'e'] {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.route, Screen::PartTypeForm(None));
        let ScreenState::Edit(edit) = &app.screen else {
            panic!("left the form");
        };
        assert_eq!(edit.form.text("name").as_deref(), Some("tee"));

        // F-keys still navigate
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.route, Screen::Home);
    }

    #[tokio::test]
    async fn held_backspace_keeps_deleting_in_forms() {
        let mut app = app();
        app.navigate(Screen::PartTypeForm(None));
        for c in ['a', 'b', 'c'] {
            press(&mut app, KeyCode::Char(c));
        }

        // No release events: the terminal reports a held key as repeated presses
        for _ in 0..3 {
            handle_key_event(&mut app, KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        }
        let ScreenState::Edit(edit) = &app.screen else {
            panic!("left the form");
        };
        assert_eq!(edit.form.text("name").as_deref().unwrap_or_default(), "");
    }

    #[tokio::test]
    async fn filter_captures_letters_until_enter() {
        let mut app = app();
        app.navigate(Screen::Parts);
        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_editing);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_editing);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn modal_swallows_keys_and_confirms() {
        let mut app = app();
        app.navigate(Screen::CarHistory(3));
        press(&mut app, KeyCode::Char('c'));
        assert!(matches!(app.modal, Some(Modal::Confirm { .. })));

        // Screen switching is blocked while the question is open
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.route, Screen::CarHistory(3));

        press(&mut app, KeyCode::Char('n'));
        assert!(app.modal.is_none());
        assert!(matches!(&app.screen, ScreenState::History(h) if h.records.is_loading()));
    }

    #[tokio::test]
    async fn esc_walks_back_to_parent() {
        let mut app = app();
        app.navigate(Screen::PartForm(Some(2)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Screen::Parts);
        assert!(matches!(&app.screen, ScreenState::Parts(c) if matches!(c.rows, Loadable::Loading)));
    }
}
