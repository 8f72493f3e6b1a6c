use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the session to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Type(char),
    Backspace,
    /// Begin a test unless one is already running
    Start,
    /// Begin a test with a fresh text, abandoning any running one
    Restart,
    Reset,
    Quit,
    Ignore,
}

pub fn map_key(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('r') if ctrl => Action::Reset,
        KeyCode::Char('n') if ctrl => Action::Restart,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => Action::Ignore,
        KeyCode::Char(c) => Action::Type(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Enter => Action::Start,
        KeyCode::Tab => Action::Restart,
        KeyCode::Esc => Action::Quit,
        _ => Action::Ignore,
    }
}
