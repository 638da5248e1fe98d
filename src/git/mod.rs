//! The version-control adapter.
//!
//! Wraps the `git` binary as child processes and returns typed results. No
//! caller outside this module parses git output directly; every text
//! contract (porcelain worktree listing, numstat, `%ct` timestamps, ...)
//! is confined here.

use std::path::{Path, PathBuf};
use std::process::Command;

mod diff;
mod error;
mod parse;
mod url;


pub use diff::LineDiff;
pub use error::GitError;
pub use url::{GitRemoteUrl, parse_owner_repo, parse_remote_host, parse_remote_owner};

pub(crate) use parse::DefaultBranchName;

use crate::shell_exec::run;

/// A single `git worktree list --porcelain` entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

/// A list of worktrees with bare entries filtered out.
#[derive(Debug, Clone)]
pub struct WorktreeList {
    pub worktrees: Vec<Worktree>,
}

impl WorktreeList {
    pub(crate) fn from_raw(raw_worktrees: Vec<Worktree>) -> Self {
        let worktrees = raw_worktrees.into_iter().filter(|wt| !wt.bare).collect();
        Self { worktrees }
    }
}

impl IntoIterator for WorktreeList {
    type Item = Worktree;
    type IntoIter = std::vec::IntoIter<Worktree>;

    fn into_iter(self) -> Self::IntoIter {
        self.worktrees.into_iter()
    }
}

/// A repository rooted at a known common directory, the handle through which
/// every VCS operation is invoked.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Locate the repository containing `cwd`. Fails if `cwd` is not inside a
    /// git-controlled tree.
    pub fn discover(cwd: &Path) -> Result<Self, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(cwd)
            .args(["rev-parse", "--path-format=absolute", "--git-common-dir"]);
        let output = run(&mut cmd, Some("repo_root"))?;
        if !output.status.success() {
            return Err(GitError::NotARepository(cwd.to_path_buf()));
        }
        let git_common_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let git_dir = PathBuf::from(git_common_dir);
        // `--git-common-dir` points at `<root>/.git`; the worktree root is its parent,
        // unless this is a bare repository, in which case the dir itself is the root.
        let root = if git_dir.file_name().and_then(|n| n.to_str()) == Some(".git") {
            git_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(git_dir)
        } else {
            git_dir
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.root).args(args);
        cmd
    }

    /// `git worktree list --porcelain`, with the bare root entry excluded.
    pub fn list_worktrees(&self) -> Result<WorktreeList, GitError> {
        let output = run(&mut self.cmd(&["worktree", "list", "--porcelain"]), Some("list_worktrees"))?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git worktree list",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let raw = Worktree::parse_porcelain_list(&text)?;
        Ok(WorktreeList::from_raw(raw))
    }

    /// The worktree whose resolved path is a prefix of the resolved `cwd`.
    pub fn current_worktree(&self, cwd: &Path) -> Option<Worktree> {
        let resolved_cwd = dunce::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());
        let worktrees = self.list_worktrees().ok()?;
        worktrees.worktrees.into_iter().find(|wt| {
            dunce::canonicalize(&wt.path)
                .map(|p| resolved_cwd.starts_with(&p))
                .unwrap_or(false)
        })
    }

    /// The default branch name, via `origin/HEAD`; falls back to `"main"`.
    pub fn default_branch(&self) -> String {
        let output = run(
            &mut self.cmd(&["symbolic-ref", "--quiet", "--short", "refs/remotes/origin/HEAD"]),
            Some("default_branch"),
        );
        if let Ok(output) = output
            && output.status.success()
        {
            let text = String::from_utf8_lossy(&output.stdout);
            if let Ok(name) = DefaultBranchName::from_local("origin", &text) {
                return name.into_string();
            }
        }
        "main".to_string()
    }

    /// Epoch seconds of the last commit touching `path`'s worktree, 0 on failure.
    pub fn last_commit_ts(&self, path: &Path) -> i64 {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(["log", "-1", "--format=%ct"]);
        match run(&mut cmd, Some("last_commit_ts")) {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .trim()
                .parse()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// The full upstream ref for `branch`, if one is configured.
    pub fn upstream(&self, branch: &str) -> Option<String> {
        let output = run(
            &mut self.cmd(&[
                "rev-parse",
                "--abbrev-ref",
                &format!("{branch}@{{upstream}}"),
            ]),
            Some("upstream"),
        )
        .ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() { None } else { Some(text) }
    }

    /// `(commits only in left, commits only in right)`.
    pub fn ahead_behind(&self, left: &str, right: &str) -> Result<(usize, usize), GitError> {
        let range = format!("{left}...{right}");
        let output = run(
            &mut self.cmd(&["rev-list", "--left-right", "--count", &range]),
            Some("ahead_behind"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git rev-list",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut parts = text.trim().split_whitespace();
        let left_count: usize = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| GitError::ParseError("malformed rev-list --left-right output".into()))?;
        let right_count: usize = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| GitError::ParseError("malformed rev-list --left-right output".into()))?;
        Ok((left_count, right_count))
    }

    /// `(insertions, deletions)` of `branch` against `base`.
    pub fn diff_stats(&self, base: &str, branch: &str) -> Result<(usize, usize), GitError> {
        let range = format!("{base}...{branch}");
        let output = run(
            &mut self.cmd(&["diff", "--numstat", &range]),
            Some("diff_stats"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git diff --numstat",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let totals = LineDiff::from_numstat(&text).map_err(|e| GitError::ParseError(e.to_string()))?;
        Ok((totals.added, totals.deleted))
    }

    /// `(added, deleted, dirty)` for the working tree at `path`: committed diff
    /// against `HEAD` plus untracked files counted as one addition each.
    pub fn diff_counts(&self, path: &Path) -> (usize, usize, bool) {
        let mut status_cmd = Command::new("git");
        status_cmd
            .arg("-C")
            .arg(path)
            .args(["status", "--porcelain"]);
        let status_output = run(&mut status_cmd, Some("diff_counts_status"));

        let mut numstat_cmd = Command::new("git");
        numstat_cmd.arg("-C").arg(path).args(["diff", "--numstat"]);
        let numstat_output = run(&mut numstat_cmd, Some("diff_counts_numstat"));

        let mut added = 0;
        let mut deleted = 0;
        let mut dirty = false;
        let mut untracked = 0;

        if let Ok(output) = status_output
            && output.status.success()
        {
            let text = String::from_utf8_lossy(&output.stdout);
            for line in text.lines() {
                if line.is_empty() {
                    continue;
                }
                dirty = true;
                if line.starts_with("??") {
                    untracked += 1;
                }
            }
        }

        if let Ok(output) = numstat_output
            && output.status.success()
        {
            let text = String::from_utf8_lossy(&output.stdout);
            if let Ok(totals) = LineDiff::from_numstat(&text) {
                added += totals.added;
                deleted += totals.deleted;
            }
        }

        added += untracked;
        (added, deleted, dirty)
    }

    /// Normalize `reference` to its canonical form, or `None` if it doesn't resolve.
    pub fn resolve_ref(&self, reference: &str) -> Option<String> {
        let output = run(
            &mut self.cmd(&["rev-parse", "--verify", "--quiet", reference]),
            Some("resolve_ref"),
        )
        .ok()?;
        if output.status.success() {
            Some(reference.to_string())
        } else {
            None
        }
    }

    /// Is `ancestor` an ancestor of `descendant`?
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        run(
            &mut self.cmd(&["merge-base", "--is-ancestor", ancestor, descendant]),
            Some("is_ancestor"),
        )
        .map(|o| o.status.success())
        .unwrap_or(false)
    }

    /// Branches among `candidates` that are ancestors of `target`.
    pub fn branches_merged_into(&self, target: &str, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter(|branch| self.is_ancestor(branch, target))
            .cloned()
            .collect()
    }

    pub fn create_worktree(&self, branch: &str, path: &Path) -> Result<(), GitError> {
        if self.resolve_ref(&format!("refs/heads/{branch}")).is_some() {
            return Err(GitError::BranchExists(branch.to_string()));
        }
        let output = run(
            &mut self.cmd(&[
                "worktree",
                "add",
                "-b",
                branch,
                path.to_str().unwrap_or_default(),
            ]),
            Some("create_worktree"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git worktree add",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    pub fn remove_worktree(&self, path: &Path) -> Result<(), GitError> {
        let output = run(
            &mut self.cmd(&["worktree", "remove", path.to_str().unwrap_or_default()]),
            Some("remove_worktree"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git worktree remove",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    pub fn move_worktree(&self, src: &Path, dst: &Path) -> Result<(), GitError> {
        let output = run(
            &mut self.cmd(&[
                "worktree",
                "move",
                src.to_str().unwrap_or_default(),
                dst.to_str().unwrap_or_default(),
            ]),
            Some("move_worktree"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git worktree move",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    pub fn rename_branch(&self, old: &str, new: &str) -> Result<(), GitError> {
        let output = run(
            &mut self.cmd(&["branch", "-m", old, new]),
            Some("rename_branch"),
        )?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git branch -m",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    /// `git fetch --prune`. Failure here is non-fatal to the caller (stale
    /// network state just means slightly stale ahead/behind numbers).
    pub fn sync_repo(&self) -> Result<(), GitError> {
        let output = run(&mut self.cmd(&["fetch", "--prune"]), Some("sync_repo"))?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git fetch --prune",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    pub fn pull(&self, branch: &str) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(self.worktree_path_for(branch))
            .args(["pull", "--ff-only"]);
        let output = run(&mut cmd, Some("pull"))?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git pull",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    pub fn push(&self, branch: &str, set_upstream: bool) -> Result<(), GitError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.extend(["--set-upstream", "origin", branch]);
        }
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(self.worktree_path_for(branch)).args(&args);
        let output = run(&mut cmd, Some("push"))?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                "git push",
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(())
    }

    /// Best-effort: find the worktree path for `branch`, falling back to the
    /// repository root if none is found (callers only use this to set `cwd`).
    fn worktree_path_for(&self, branch: &str) -> PathBuf {
        self.list_worktrees()
            .ok()
            .and_then(|list| {
                list.worktrees
                    .into_iter()
                    .find(|wt| wt.branch.as_deref() == Some(branch))
            })
            .map(|wt| wt.path)
            .unwrap_or_else(|| self.root.clone())
    }
}
