// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return actions.
// App just holds Option<Modal>, input routing acts on returned ModalAction.

use crate::screens::Request;
use crossterm::event::KeyCode;

/// What to do once the operator says yes
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    /// Send a request as-is (deletes)
    Fetch(Request),
    /// Clear the history shown on the current screen
    ClearHistory,
}

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    /// Close and run the confirmed action
    Confirm(ConfirmAction),
}

/// Available modal types
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    /// Blocking yes/no question before an irreversible call
    Confirm {
        prompt: String,
        action: ConfirmAction,
    },
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    pub fn confirm(prompt: impl Into<String>, action: ConfirmAction) -> Self {
        Modal::Confirm {
            prompt: prompt.into(),
            action,
        }
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(6) => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
            Modal::Confirm { action, .. } => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    ModalAction::Confirm(action.clone())
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_answers() {
        let modal = Modal::confirm("Delete part P1?", ConfirmAction::Fetch(Request::DeletePart(1)));
        assert_eq!(
            modal.handle_input(KeyCode::Char('y')),
            ModalAction::Confirm(ConfirmAction::Fetch(Request::DeletePart(1)))
        );
        assert_eq!(modal.handle_input(KeyCode::Esc), ModalAction::Close);
        assert_eq!(modal.handle_input(KeyCode::Char('x')), ModalAction::None);
    }

    #[test]
    fn help_closes_on_its_own_key() {
        assert_eq!(Modal::help().handle_input(KeyCode::Char('?')), ModalAction::Close);
        assert_eq!(Modal::help().handle_input(KeyCode::Down), ModalAction::None);
    }
}
