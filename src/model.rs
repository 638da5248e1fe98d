//! The status model shared across the cache, aggregator, scheduler, and TUI.

use std::path::PathBuf;

/// Derive the cache key for a worktree: its branch name, or
/// `detached:<head>` when it has none.
pub fn cache_key(branch: Option<&str>, head: &str) -> String {
    match branch {
        Some(b) if !b.is_empty() => b.to_string(),
        _ => format!("detached:{head}"),
    }
}

/// Rollup of CI checks for a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChecksInfo {
    pub passed: u32,
    pub total: u32,
    pub state: Option<CheckState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Ok,
    Pending,
    Failed,
}

impl CheckState {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckState::Ok => "ok",
            CheckState::Pending => "pend",
            CheckState::Failed => "fail",
        }
    }
}

/// A pull request associated with a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub base: String,
    pub url: String,
}

/// Whether a section of a [`WorktreeStatus`] reflects freshly-fetched data or
/// a cached value that hasn't been revalidated yet this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Freshness {
    pub pull_push: bool,
    pub changes: bool,
    pub pr: bool,
    pub checks: bool,
}

impl Freshness {
    pub fn all_stale() -> Self {
        Self::default()
    }

    pub fn all_fresh() -> Self {
        Self {
            pull_push: true,
            changes: true,
            pr: true,
            checks: true,
        }
    }
}

/// Full status snapshot for a single worktree, assembled by the aggregator
/// from the VCS adapter, the forge adapter, and the cache.
#[derive(Debug, Clone)]
pub struct WorktreeStatus {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: String,
    pub cache_key: String,
    pub last_commit_ts: i64,
    pub upstream: Option<String>,
    pub ahead: Option<u32>,
    pub behind: Option<u32>,
    pub additions: u32,
    pub deletions: u32,
    pub dirty: bool,
    pub pr: Option<PullRequestInfo>,
    pub checks: Option<ChecksInfo>,
    pub changes_target: Option<String>,
    pub changes_added: Option<u32>,
    pub changes_deleted: Option<u32>,
    pub fresh: Freshness,
}

impl WorktreeStatus {
    pub fn display_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached)")
    }

    pub fn is_detached(&self) -> bool {
        self.branch.is_none()
    }
}
