// Key debouncing
//
// Terminals without the keyboard enhancement protocol never report releases,
// so a held key arrives as a stream of presses. Shortcuts fire once per
// press; selection keys start repeating after a delay. Keys typed into a field
// bypass this entirely (see `is_editing_key`).

use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Gap after which a held shortcut counts as a new press when no release
/// event ever arrives
const RETRIGGER_GAP: Duration = Duration::from_millis(150);

/// How a held key behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fire once per press (shortcuts, Enter, Tab, delete prompts)
    Once,
    /// Fire on press, then every `interval` once held for `delay`
    After { delay: Duration, interval: Duration },
}

/// Hold behavior of a key on fleetdesk's screens
pub fn repeat_for(key: KeyCode) -> Repeat {
    match key {
        // Row selection and selector cycling
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Char('j')
        | KeyCode::Char('k') => Repeat::After {
            delay: Duration::from_millis(500),
            interval: Duration::from_millis(50),
        },
        KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home | KeyCode::End => Repeat::After {
            delay: Duration::from_millis(300),
            interval: Duration::from_millis(30),
        },
        _ => Repeat::Once,
    }
}

/// Keys that edit text while a field or the filter line has focus
pub fn is_editing_key(key: KeyCode) -> bool {
    matches!(key, KeyCode::Char(_) | KeyCode::Backspace)
}

#[derive(Debug, Clone, Copy)]
struct Held {
    since: Instant,
    last_fired: Instant,
}

/// Tracks held keys and decides which presses become actions
#[derive(Debug, Default)]
pub struct KeyDebouncer {
    held: HashMap<KeyCode, Held>,
}

impl KeyDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A press arrived at `now`; true if it should act
    pub fn press(&mut self, key: KeyCode, now: Instant) -> bool {
        let Some(held) = self.held.get_mut(&key) else {
            self.held.insert(key, Held { since: now, last_fired: now });
            return true;
        };

        let fire = match repeat_for(key) {
            Repeat::Once => now.duration_since(held.last_fired) >= RETRIGGER_GAP,
            Repeat::After { delay, interval } => {
                now.duration_since(held.since) >= delay
                    && now.duration_since(held.last_fired) >= interval
            }
        };
        if fire {
            held.last_fired = now;
        }
        fire
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }
}
