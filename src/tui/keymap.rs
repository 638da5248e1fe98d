//! Single-keystroke key bindings for the worktree screen.

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    Select,
    Quit,
    Refresh,
    New,
    Delete,
    Rename,
    Pull,
    Push,
}

/// Map a raw key event to an [`Action`], or `None` for unbound keys.
/// Case-sensitive: `d`/`D` and `r`/`R` are distinct bindings (delete/rename
/// vs. nothing/refresh).
pub fn dispatch(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('n') => Some(Action::New),
        KeyCode::Char('D') => Some(Action::Delete),
        KeyCode::Char('R') => Some(Action::Rename),
        KeyCode::Char('p') => Some(Action::Pull),
        KeyCode::Char('P') => Some(Action::Push),
        _ => None,
    }
}
