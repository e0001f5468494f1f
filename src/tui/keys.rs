// Screen key bindings
//
// Maps a key press onto the mounted screen's state. Screens stay free of
// terminal types; whatever needs the app (modals, clipboard, navigation)
// comes back as a `KeyAction` for the event loop to carry out.

use super::app::ScreenState;
use super::clipboard::to_tsv;
use super::modal::{ConfirmAction, Modal};
use crate::screens::catalog::{Catalog, CatalogRow};
use crate::screens::mileage::{MileageFocus, MileageForm};
use crate::screens::{Effect, Screen};
use crossterm::event::{KeyCode, KeyEvent};

/// What the event loop should do after a screen handled a key
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    None,
    Effects(Vec<Effect>),
    Modal(Modal),
    Copy(String),
    /// Start typing into the catalog filter
    StartFilter,
    /// Remount the current screen
    Refresh,
}

impl From<Vec<Effect>> for KeyAction {
    fn from(effects: Vec<Effect>) -> Self {
        if effects.is_empty() {
            Self::None
        } else {
            Self::Effects(effects)
        }
    }
}

fn go(route: Screen) -> KeyAction {
    KeyAction::Effects(vec![Effect::Navigate(route)])
}

pub fn handle(screen: &mut ScreenState, key: KeyEvent) -> KeyAction {
    match screen {
        ScreenState::Cars(c) => catalog_key(c, key.code),
        ScreenState::Parts(c) => catalog_key(c, key.code),
        ScreenState::PartTypes(c) => catalog_key(c, key.code),
        ScreenState::Events(c) => match key.code {
            KeyCode::Char('a') => c
                .selected()
                .map_or(KeyAction::None, |event| go(Screen::EventAssign(event.id))),
            code => catalog_key(c, code),
        },
        ScreenState::Mileage(m) => mileage_key(m, key.code),
        ScreenState::Edit(e) => match key.code {
            KeyCode::Tab | KeyCode::Down => {
                e.form.focus_next();
                KeyAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                e.form.focus_prev();
                KeyAction::None
            }
            KeyCode::Left => {
                e.form.cycle(-1);
                KeyAction::None
            }
            KeyCode::Right => {
                e.form.cycle(1);
                KeyAction::None
            }
            KeyCode::Backspace => {
                e.form.backspace();
                KeyAction::None
            }
            KeyCode::Enter => e.submit().into(),
            KeyCode::Char(c) => {
                e.form.insert_char(c);
                KeyAction::None
            }
            _ => KeyAction::None,
        },
        ScreenState::History(h) => match key.code {
            KeyCode::Char('c') => KeyAction::Modal(Modal::confirm(
                h.clear_prompt(),
                ConfirmAction::ClearHistory,
            )),
            KeyCode::Char('y') => {
                let rows = h.rows();
                KeyAction::Copy(to_tsv(
                    rows.iter()
                        .map(|r| [&r.timestamp, &r.field, &r.old_value, &r.new_value]),
                ))
            }
            KeyCode::Char('r') => KeyAction::Refresh,
            _ => KeyAction::None,
        },
        ScreenState::CarDetail(d) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                d.cursor_down();
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                d.cursor_up();
                KeyAction::None
            }
            KeyCode::Enter => d
                .selected_part()
                .map_or(KeyAction::None, |p| go(Screen::PartForm(Some(p.id)))),
            KeyCode::Char('E') => go(Screen::CarForm(Some(d.id))),
            KeyCode::Char('H') => go(Screen::CarHistory(d.id)),
            KeyCode::Char('y') => d
                .car
                .ready()
                .map_or(KeyAction::None, |car| KeyAction::Copy(car.chassis_number.clone())),
            KeyCode::Char('r') => KeyAction::Refresh,
            _ => KeyAction::None,
        },
        ScreenState::Assignment(a) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                a.cursor_down();
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                a.cursor_up();
                KeyAction::None
            }
            KeyCode::Char(' ') => {
                a.select_cursor();
                KeyAction::None
            }
            KeyCode::Enter | KeyCode::Char('a') => a.attach().into(),
            KeyCode::Char('x') => a.detach().into(),
            KeyCode::Char('r') => KeyAction::Refresh,
            _ => KeyAction::None,
        },
    }
}

fn catalog_key<T: CatalogRow>(catalog: &mut Catalog<T>, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            catalog.select_next();
            KeyAction::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            catalog.select_prev();
            KeyAction::None
        }
        KeyCode::Char('/') => KeyAction::StartFilter,
        KeyCode::Char(c @ '1'..='3') => {
            catalog.toggle_sort(c as usize - '1' as usize);
            KeyAction::None
        }
        KeyCode::Char('n') => go(T::new_route()),
        KeyCode::Enter => catalog
            .selected()
            .map_or(KeyAction::None, |row| go(row.open_route())),
        KeyCode::Char('H') => catalog
            .selected()
            .and_then(|row| row.history_route())
            .map_or(KeyAction::None, go),
        KeyCode::Char('d') | KeyCode::Delete => {
            match (catalog.delete_prompt(), catalog.delete_selected()) {
                (Some(prompt), Some(request)) => {
                    KeyAction::Modal(Modal::confirm(prompt, ConfirmAction::Fetch(request)))
                }
                _ => KeyAction::None,
            }
        }
        KeyCode::Char('y') => catalog
            .selected()
            .map_or(KeyAction::None, |row| KeyAction::Copy(to_tsv([row.cells()]))),
        KeyCode::Char('r') => KeyAction::Refresh,
        _ => KeyAction::None,
    }
}

fn mileage_key(form: &mut MileageForm, code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Tab => {
            form.next_focus();
            return KeyAction::None;
        }
        KeyCode::BackTab => {
            form.prev_focus();
            return KeyAction::None;
        }
        KeyCode::Enter => return form.submit_effects().into(),
        _ => {}
    }

    match (form.focus, code) {
        (MileageFocus::Vehicle, KeyCode::Left) => form.cycle_vehicle(-1).into(),
        (MileageFocus::Vehicle, KeyCode::Right) => form.cycle_vehicle(1).into(),
        (MileageFocus::Delta, KeyCode::Char(c)) => {
            form.push_delta_char(c);
            KeyAction::None
        }
        (MileageFocus::Delta, KeyCode::Backspace) => {
            form.pop_delta_char();
            KeyAction::None
        }
        (MileageFocus::Parts, KeyCode::Down) => {
            form.cursor_down();
            KeyAction::None
        }
        (MileageFocus::Parts, KeyCode::Up) => {
            form.cursor_up();
            KeyAction::None
        }
        (MileageFocus::Parts, KeyCode::Char(' ')) => {
            form.toggle_cursor_part();
            KeyAction::None
        }
        (MileageFocus::Parts, KeyCode::Char(c)) if c.is_ascii_digit() || c == '-' => {
            form.push_override_char(c);
            KeyAction::None
        }
        (MileageFocus::Parts, KeyCode::Backspace) => {
            form.pop_override_char();
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Keys while the catalog filter has focus; returns `false` once editing ends
pub fn filter_key(screen: &mut ScreenState, code: KeyCode) -> bool {
    match screen {
        ScreenState::Cars(c) => edit_filter(c, code),
        ScreenState::Parts(c) => edit_filter(c, code),
        ScreenState::PartTypes(c) => edit_filter(c, code),
        ScreenState::Events(c) => edit_filter(c, code),
        _ => false,
    }
}

fn edit_filter<T: CatalogRow>(catalog: &mut Catalog<T>, code: KeyCode) -> bool {
    match code {
        KeyCode::Enter | KeyCode::Esc => false,
        KeyCode::Backspace => {
            catalog.pop_filter_char();
            true
        }
        KeyCode::Down => {
            catalog.select_next();
            true
        }
        KeyCode::Up => {
            catalog.select_prev();
            true
        }
        KeyCode::Char(c) => {
            catalog.push_filter_char(c);
            true
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Car, Event};
    use crate::screens::{Loadable, Request};
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn car(id: i64, chassis: &str) -> Car {
        Car {
            id,
            chassis_number: chassis.to_string(),
            driver: None,
            last_event: None,
        }
    }

    fn cars_screen() -> ScreenState {
        let mut catalog = Catalog::new();
        catalog.rows = Loadable::Ready(vec![car(1, "BMW-1"), car(2, "AUDI-7")]);
        ScreenState::Cars(catalog)
    }

    #[test]
    fn catalog_enter_opens_selected_row() {
        let mut screen = cars_screen();
        handle(&mut screen, press(KeyCode::Down));
        assert_eq!(
            handle(&mut screen, press(KeyCode::Enter)),
            go(Screen::CarDetail(2))
        );
    }

    #[test]
    fn catalog_delete_asks_first() {
        let mut screen = cars_screen();
        match handle(&mut screen, press(KeyCode::Char('d'))) {
            KeyAction::Modal(Modal::Confirm { prompt, action }) => {
                assert_eq!(prompt, "Delete vehicle BMW-1?");
                assert_eq!(action, ConfirmAction::Fetch(Request::DeleteCar(1)));
            }
            other => panic!("expected confirm, got {:?}", other),
        }
    }

    #[test]
    fn sort_key_orders_rows() {
        let mut screen = cars_screen();
        handle(&mut screen, press(KeyCode::Char('2')));
        let ScreenState::Cars(catalog) = &screen else {
            panic!("screen changed");
        };
        assert_eq!(catalog.selected().map(|c| c.id), Some(2));
    }

    #[test]
    fn filter_typing_narrows_and_enter_ends() {
        let mut screen = cars_screen();
        assert!(filter_key(&mut screen, KeyCode::Char('a')));
        assert!(filter_key(&mut screen, KeyCode::Char('u')));
        assert!(!filter_key(&mut screen, KeyCode::Enter));
        let ScreenState::Cars(catalog) = &screen else {
            panic!("screen changed");
        };
        assert_eq!(catalog.filter(), "au");
        assert_eq!(catalog.visible().len(), 1);
    }

    #[test]
    fn events_catalog_opens_assignment() {
        let mut catalog = Catalog::new();
        catalog.rows = Loadable::Ready(vec![Event {
            id: 4,
            name: "Spa".to_string(),
            date: "2024-05-01".to_string(),
            notes: None,
            cars: vec![],
            car_chassis_numbers: vec![],
        }]);
        let mut screen = ScreenState::Events(catalog);
        assert_eq!(
            handle(&mut screen, press(KeyCode::Char('a'))),
            go(Screen::EventAssign(4))
        );
    }

    #[test]
    fn copy_joins_cells_with_tabs() {
        let mut screen = cars_screen();
        assert_eq!(
            handle(&mut screen, press(KeyCode::Char('y'))),
            KeyAction::Copy("1\tBMW-1\t-\t-".to_string())
        );
    }

    #[test]
    fn form_typing_goes_to_focused_field() {
        let mut screen = ScreenState::for_route(Screen::PartTypeForm(None));
        handle(&mut screen, press(KeyCode::Char('q')));
        handle(&mut screen, press(KeyCode::Tab));
        handle(&mut screen, press(KeyCode::Char('9')));
        let ScreenState::Edit(edit) = &screen else {
            panic!("screen changed");
        };
        assert_eq!(edit.form.text("name").as_deref(), Some("q"));
        assert_eq!(edit.form.number("max_mileage"), Some(9));
    }
}
