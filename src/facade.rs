//! The application facade: the single entry point the CLI and TUI call into.
//!
//! Owns the ordered row list, the latest status per path, and the cursor.
//! Every field is behind one mutex; lifecycle operations copy state out,
//! run the subprocess, then copy the result back in — never holding the
//! lock across a child-process call (see the concurrency rules in
//! [`crate::scheduler`]).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::cache::CacheStore;
use crate::git::{GitError, Repository};
use crate::model::WorktreeStatus;

struct State {
    row_order: Vec<PathBuf>,
    statuses_by_path: std::collections::HashMap<PathBuf, WorktreeStatus>,
    cached_paths: HashSet<PathBuf>,
    cursor: usize,
}

/// The facade's owned adapters plus the guarded, mutable view the TUI reads.
pub struct Facade {
    repo: Repository,
    cache: CacheStore,
    state: Mutex<State>,
}

impl Facade {
    pub fn new(repo: Repository, cache: CacheStore) -> Self {
        Self {
            repo,
            cache,
            state: Mutex::new(State {
                row_order: Vec::new(),
                statuses_by_path: std::collections::HashMap::new(),
                cached_paths: HashSet::new(),
                cursor: 0,
            }),
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Replace the status list, preserving the existing order for surviving
    /// paths and appending newcomers.
    pub fn set_statuses(&self, statuses: Vec<WorktreeStatus>, stale: bool) {
        let mut state = self.state.lock().unwrap();
        let mut new_order = Vec::with_capacity(statuses.len());
        let incoming_order: Vec<PathBuf> = statuses.iter().map(|s| s.path.clone()).collect();
        let by_path: std::collections::HashMap<_, _> =
            statuses.into_iter().map(|s| (s.path.clone(), s)).collect();

        for path in &state.row_order {
            if by_path.contains_key(path) {
                new_order.push(path.clone());
            }
        }
        let mut seen: HashSet<_> = new_order.iter().cloned().collect();
        for path in incoming_order {
            if seen.insert(path.clone()) {
                new_order.push(path);
            }
        }

        state.cached_paths.clear();
        for (path, status) in by_path {
            if stale {
                state.cached_paths.insert(path.clone());
            }
            state.statuses_by_path.insert(path, status);
        }
        state.row_order = new_order;
        if state.cursor >= state.row_order.len() {
            state.cursor = state.row_order.len().saturating_sub(1);
        }
    }

    pub fn update_status(&self, status: WorktreeStatus, fresh: bool) {
        let mut state = self.state.lock().unwrap();
        let path = status.path.clone();
        if !state.row_order.contains(&path) {
            state.row_order.push(path.clone());
        }
        if fresh {
            state.cached_paths.remove(&path);
        }
        state.statuses_by_path.insert(path, status);
    }

    /// A snapshot of rows in display order, for rendering.
    pub fn snapshot(&self) -> Vec<WorktreeStatus> {
        let state = self.state.lock().unwrap();
        state
            .row_order
            .iter()
            .filter_map(|p| state.statuses_by_path.get(p).cloned())
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    pub fn move_cursor(&self, delta: isize) {
        let mut state = self.state.lock().unwrap();
        if state.row_order.is_empty() {
            return;
        }
        let len = state.row_order.len() as isize;
        let next = (state.cursor as isize + delta).rem_euclid(len);
        state.cursor = next as usize;
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        state.row_order.get(state.cursor).cloned()
    }

    fn status_of(&self, path: &Path) -> Option<WorktreeStatus> {
        self.state.lock().unwrap().statuses_by_path.get(path).cloned()
    }

    fn resolve_target(&self, target: Option<&Path>) -> Option<PathBuf> {
        target.map(Path::to_path_buf).or_else(|| self.selected_path())
    }

    /// Create a new worktree at `<repo_root>/<branch>` and check out `branch`.
    pub fn new_worktree(&self, branch: &str) -> Result<PathBuf, GitError> {
        let path = self.repo.root().join(branch);
        self.repo.create_worktree(branch, &path)?;
        Ok(path)
    }

    /// Delete the worktree at `target` (or the selected row). Refuses
    /// detached worktrees.
    pub fn delete(&self, target: Option<&Path>) -> Result<(), GitError> {
        let path = self
            .resolve_target(target)
            .ok_or_else(|| GitError::ParseError("no worktree selected".into()))?;
        let status = self.status_of(&path);
        if status.is_none_or(|s| s.is_detached()) {
            return Err(GitError::DetachedOperation { action: "delete" });
        }
        self.repo.remove_worktree(&path)?;
        self.state.lock().unwrap().row_order.retain(|p| p != &path);
        Ok(())
    }

    /// Delete every worktree whose branch has been merged into the default
    /// branch's upstream, excluding the default branch's own worktree.
    pub fn delete_merged(&self) -> Result<Vec<PathBuf>, GitError> {
        let default_branch = self.repo.default_branch();
        let Some(upstream) = self.repo.upstream(&default_branch) else {
            return Ok(Vec::new());
        };

        let worktrees = self.repo.list_worktrees()?;
        let candidates: Vec<String> = worktrees
            .worktrees
            .iter()
            .filter_map(|wt| wt.branch.clone())
            .filter(|b| b != &default_branch)
            .collect();
        let merged = self.repo.branches_merged_into(&upstream, &candidates);

        let mut deleted = Vec::new();
        for wt in self.repo.list_worktrees()?.worktrees {
            if let Some(branch) = &wt.branch
                && merged.contains(branch)
            {
                self.repo.remove_worktree(&wt.path)?;
                deleted.push(wt.path);
            }
        }
        Ok(deleted)
    }

    /// Delete every worktree with no upstream, excluding the default branch.
    pub fn delete_no_upstream(&self) -> Result<Vec<PathBuf>, GitError> {
        let default_branch = self.repo.default_branch();
        let mut deleted = Vec::new();
        for wt in self.repo.list_worktrees()?.worktrees {
            let Some(branch) = &wt.branch else { continue };
            if branch == &default_branch {
                continue;
            }
            if self.repo.upstream(branch).is_none() {
                self.repo.remove_worktree(&wt.path)?;
                deleted.push(wt.path);
            }
        }
        Ok(deleted)
    }

    /// Rename `old` to `new`: renames the branch and moves the worktree
    /// directory to match.
    pub fn rename(&self, old: &str, new: &str) -> Result<PathBuf, GitError> {
        let worktrees = self.repo.list_worktrees()?;
        let wt = worktrees
            .worktrees
            .into_iter()
            .find(|wt| wt.branch.as_deref() == Some(old))
            .ok_or_else(|| GitError::ParseError(format!("no worktree for branch '{old}'")))?;

        self.repo.rename_branch(old, new)?;
        let new_path = self.repo.root().join(new);
        self.repo.move_worktree(&wt.path, &new_path)?;

        let mut state = self.state.lock().unwrap();
        for path in state.row_order.iter_mut() {
            if *path == wt.path {
                *path = new_path.clone();
            }
        }
        if let Some(status) = state.statuses_by_path.remove(&wt.path) {
            state.statuses_by_path.insert(new_path.clone(), status);
        }
        Ok(new_path)
    }

    /// `git pull --ff-only` on `target`'s branch. Refuses detached worktrees.
    pub fn pull(&self, target: Option<&Path>) -> Result<(), GitError> {
        let path = self
            .resolve_target(target)
            .ok_or_else(|| GitError::ParseError("no worktree selected".into()))?;
        let branch = self
            .status_of(&path)
            .and_then(|s| s.branch)
            .ok_or(GitError::DetachedOperation { action: "pull" })?;
        self.repo.pull(&branch)
    }

    /// `git push` on `target`'s branch. Refuses detached worktrees.
    pub fn push(&self, target: Option<&Path>) -> Result<(), GitError> {
        let path = self
            .resolve_target(target)
            .ok_or_else(|| GitError::ParseError("no worktree selected".into()))?;
        let status = self.status_of(&path);
        let branch = status
            .as_ref()
            .and_then(|s| s.branch.clone())
            .ok_or(GitError::DetachedOperation { action: "push" })?;
        let needs_upstream = status.and_then(|s| s.upstream).is_none();
        self.repo.push(&branch, needs_upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Freshness;

    fn status(path: &str, branch: Option<&str>) -> WorktreeStatus {
        WorktreeStatus {
            path: PathBuf::from(path),
            branch: branch.map(str::to_string),
            head: "abc".into(),
            cache_key: branch.unwrap_or("detached:abc").into(),
            last_commit_ts: 0,
            upstream: None,
            ahead: None,
            behind: None,
            additions: 0,
            deletions: 0,
            dirty: false,
            pr: None,
            checks: None,
            changes_target: None,
            changes_added: None,
            changes_deleted: None,
            fresh: Freshness::all_stale(),
        }
    }

    fn facade_with(statuses: Vec<WorktreeStatus>) -> Facade {
        let dir = tempfile::tempdir().unwrap();
        std::process::Command::new("git")
            .args(["init", "--quiet"])
            .arg(dir.path())
            .status()
            .unwrap();
        let repo = Repository::discover(dir.path()).unwrap();
        let cache = CacheStore::open_at(&dir.path().join("cache.db")).unwrap();
        let facade = Facade::new(repo, cache);
        facade.set_statuses(statuses, true);
        facade
    }

    #[test]
    fn test_set_statuses_orders_by_insertion_then_appends_new() {
        let facade = facade_with(vec![status("/repo/a", Some("a")), status("/repo/b", Some("b"))]);
        let snapshot = facade.snapshot();
        assert_eq!(snapshot.len(), 2);

        facade.set_statuses(
            vec![
                status("/repo/b", Some("b")),
                status("/repo/a", Some("a")),
                status("/repo/c", Some("c")),
            ],
            true,
        );
        let paths: Vec<_> = facade.snapshot().into_iter().map(|s| s.path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/repo/a"),
                PathBuf::from("/repo/b"),
                PathBuf::from("/repo/c"),
            ]
        );
    }

    #[test]
    fn test_move_cursor_wraps() {
        let facade = facade_with(vec![status("/repo/a", Some("a")), status("/repo/b", Some("b"))]);
        assert_eq!(facade.cursor(), 0);
        facade.move_cursor(-1);
        assert_eq!(facade.cursor(), 1);
        facade.move_cursor(1);
        assert_eq!(facade.cursor(), 0);
    }

    #[test]
    fn test_delete_detached_is_refused() {
        let facade = facade_with(vec![status("/repo/a", None)]);
        let err = facade.delete(Some(Path::new("/repo/a"))).unwrap_err();
        assert!(matches!(err, GitError::DetachedOperation { action: "delete" }));
    }
}
