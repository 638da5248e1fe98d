//! Modal sub-state-machines: small synchronous prompts entered from the
//! main key-dispatch loop. Background probes keep running on their own
//! threads while a modal blocks the TUI thread awaiting a keystroke.

use crossterm::event::{self, Event, KeyCode};

/// `y`/`Y` resolves true; `n`/`N`/`Esc` resolves false. Any other key is ignored.
pub fn confirm(prompt: &str) -> std::io::Result<bool> {
    super::draw_status_line(&format!("{prompt} (y/N)"))?;
    loop {
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                _ => {}
            }
        }
    }
}

/// Enter resolves to the trimmed value, or `None` if empty. `Esc` resolves
/// to `None` immediately.
pub fn text_input(prompt: &str) -> std::io::Result<Option<String>> {
    let mut buffer = String::new();
    loop {
        super::draw_status_line(&format!("{prompt}{buffer}"))?;
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Enter => {
                    let trimmed = buffer.trim();
                    return Ok(if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    });
                }
                KeyCode::Esc => return Ok(None),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            }
        }
    }
}
