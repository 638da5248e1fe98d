//! The TUI runtime: manual cursor-addressed redraw on raw-mode `crossterm`,
//! plus a non-interactive fallback for piped output.

mod keymap;
mod modal;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor;
use crossterm::event::{self, Event};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};

use keymap::Action;
use worktrunk::facade::Facade;
use worktrunk::scheduler::Scheduler;

/// Run the interactive screen; returns the selected path, or `None` if the
/// user exited without selecting one.
pub fn run(facade: Arc<Facade>, scheduler: Scheduler) -> std::io::Result<Option<PathBuf>> {
    if !std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        return run_noninteractive(&facade, &scheduler);
    }

    terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, cursor::Hide)?;

    scheduler.seed_from_cache().ok();
    draw_full(&facade)?;
    scheduler.request_refresh();

    let result = loop {
        if !event::poll(Duration::from_millis(100))? {
            draw_full(&facade)?;
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(action) = keymap::dispatch(key) else {
            continue;
        };

        match action {
            Action::MoveUp => {
                facade.move_cursor(-1);
                draw_full(&facade)?;
            }
            Action::MoveDown => {
                facade.move_cursor(1);
                draw_full(&facade)?;
            }
            Action::Select => break facade.selected_path(),
            Action::Quit => break None,
            Action::Refresh => {
                scheduler.request_refresh();
                draw_full(&facade)?;
            }
            Action::New => {
                if let Some(branch) = modal::text_input("New branch: ")? {
                    match facade.new_worktree(&branch) {
                        Ok(_) => scheduler.request_refresh(),
                        Err(e) => draw_status_line(&format!("New failed: {e}"))?,
                    }
                }
                draw_full(&facade)?;
            }
            Action::Delete => {
                let Some(path) = facade.selected_path() else {
                    continue;
                };
                if modal::confirm(&format!("Delete {}?", path.display()))? {
                    match facade.delete(Some(&path)) {
                        Ok(()) => scheduler.request_refresh(),
                        Err(e) => draw_status_line(&format!("Delete failed: {e}"))?,
                    }
                }
                draw_full(&facade)?;
            }
            Action::Rename => {
                let Some(path) = facade.selected_path() else {
                    continue;
                };
                let old_branch = facade
                    .snapshot()
                    .into_iter()
                    .find(|s| s.path == path)
                    .and_then(|s| s.branch);
                if let (Some(old), Some(new)) = (old_branch, modal::text_input("Rename to: ")?) {
                    match facade.rename(&old, &new) {
                        Ok(_) => scheduler.request_refresh(),
                        Err(e) => draw_status_line(&format!("Rename failed: {e}"))?,
                    }
                }
                draw_full(&facade)?;
            }
            Action::Pull => {
                let path = facade.selected_path();
                match facade.pull(path.as_deref()) {
                    Ok(()) => scheduler.request_refresh(),
                    Err(e) => draw_status_line(&format!("Pull failed: {e}"))?,
                }
                draw_full(&facade)?;
            }
            Action::Push => {
                let path = facade.selected_path();
                match facade.push(path.as_deref()) {
                    Ok(()) => scheduler.request_refresh(),
                    Err(e) => draw_status_line(&format!("Push failed: {e}"))?,
                }
                draw_full(&facade)?;
            }
        }
    };

    scheduler.stop();
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()?;
    Ok(result)
}

/// Non-interactive path: one synchronous refresh cycle, then print the
/// final table once. Used when stdout isn't a TTY.
fn run_noninteractive(facade: &Arc<Facade>, scheduler: &Scheduler) -> std::io::Result<Option<PathBuf>> {
    scheduler.seed_from_cache().ok();
    scheduler.request_refresh();
    scheduler.wait_idle();
    print_table(facade);
    Ok(None)
}

fn print_table(facade: &Facade) {
    let now = worktrunk::utils::now_iso8601();
    let now = chrono::DateTime::parse_from_rfc3339(&now)
        .map(|dt| dt.timestamp())
        .unwrap_or(0);
    println!("{}", render::header_line());
    println!("{}", render::separator_line());
    for status in facade.snapshot() {
        println!("{}", render::format_row(&status, now, false, false));
    }
}

fn draw_full(facade: &Facade) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let now = worktrunk::utils::now_iso8601();
    let now = chrono::DateTime::parse_from_rfc3339(&now)
        .map(|dt| dt.timestamp())
        .unwrap_or(0);

    queue!(stdout, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
    writeln!(stdout, "Up/Down: move  Enter: select  r: refresh  n: new  D: delete  R: rename  p: pull  P: push  q: quit\r")?;
    writeln!(stdout, "\r")?;
    writeln!(stdout, "{}\r", render::header_line())?;
    writeln!(stdout, "{}\r", render::separator_line())?;

    let cursor_idx = facade.cursor();
    for (idx, status) in facade.snapshot().into_iter().enumerate() {
        writeln!(
            stdout,
            "{}\r",
            render::format_row(&status, now, idx == cursor_idx, worktrunk::styling::supports_hyperlinks(worktrunk::styling::Stream::Stdout))
        )?;
    }
    stdout.flush()
}

fn draw_status_line(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    queue!(stdout, cursor::MoveToNextLine(1), terminal::Clear(ClearType::CurrentLine))?;
    write!(stdout, "{text}\r")?;
    stdout.flush()
}
