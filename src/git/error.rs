//! Error kinds surfaced by the version-control adapter.

use std::path::PathBuf;

use crate::styling::error_message;

/// Errors produced by the VCS adapter.
///
/// Each variant is a distinct failure *kind* rather than a generic wrapper, so
/// callers can pattern-match on what actually went wrong (detached worktree,
/// missing repository, a plain non-zero exit) instead of parsing message text.
#[derive(Debug)]
pub enum GitError {
    /// `cwd` is not inside a version-controlled tree.
    NotARepository(PathBuf),
    /// The VCS tool exited non-zero; stderr is attached verbatim.
    CommandFailed { command: String, stderr: String },
    /// Output from the VCS tool could not be parsed as expected.
    ParseError(String),
    /// `create_worktree` was asked to create a branch that already exists.
    BranchExists(String),
    /// An operation that requires a branch was attempted on a detached worktree.
    DetachedOperation { action: &'static str },
}

impl GitError {
    pub(crate) fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        GitError::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::NotARepository(path) => write!(
                f,
                "{}",
                error_message(format!("{} is not inside a git repository", path.display()))
            ),
            GitError::CommandFailed { command, stderr } => {
                let trimmed = stderr.trim();
                if trimmed.is_empty() {
                    write!(f, "{}", error_message(format!("{command} failed")))
                } else {
                    write!(f, "{}", error_message(format!("{command} failed: {trimmed}")))
                }
            }
            GitError::ParseError(msg) => write!(f, "{}", error_message(msg)),
            GitError::BranchExists(branch) => {
                write!(f, "{}", error_message(format!("branch '{branch}' already exists")))
            }
            GitError::DetachedOperation { action } => write!(
                f,
                "{}",
                error_message(format!("Cannot {action} a detached worktree."))
            ),
        }
    }
}

impl std::error::Error for GitError {}

impl From<std::io::Error> for GitError {
    fn from(e: std::io::Error) -> Self {
        GitError::command_failed("spawn", e.to_string())
    }
}
