//! The status aggregator: combines the cache, the VCS adapter, and the forge
//! adapter into [`WorktreeStatus`] snapshots, in three widening stages.
//!
//! - `placeholder`: cache only, no subprocesses. Used for the first paint.
//! - `local`: adds diff stats and ahead/behind against the default branch.
//!   No network.
//! - `remote`: adds upstream-based pull/push counts (after `git fetch`) and,
//!   when a forge is configured, pull-request and CI status.

use std::path::Path;

use crate::cache::CacheStore;
use crate::forge;
use crate::git::Repository;
use crate::model::{self, Freshness, WorktreeStatus};

/// Build a cache-seeded snapshot without running any subprocess beyond the
/// worktree listing itself. Every section is marked stale.
pub fn placeholder(repo: &Repository, cache: &CacheStore) -> anyhow::Result<Vec<WorktreeStatus>> {
    let worktrees = repo.list_worktrees()?;
    let cached = cache.load_all().unwrap_or_default();

    let mut statuses = Vec::new();
    for wt in worktrees {
        let key = model::cache_key(wt.branch.as_deref(), &wt.head);
        let entry = cached.get(&key);

        let (changes_target, changes_added, changes_deleted) = match entry {
            Some(e) if e.changes_target.is_some() && e.changes_added.is_some() && e.changes_deleted.is_some() => {
                (e.changes_target.clone(), e.changes_added, e.changes_deleted)
            }
            _ => (None, None, None),
        };

        statuses.push(WorktreeStatus {
            last_commit_ts: entry.and_then(|e| e.last_commit_ts).unwrap_or(0),
            upstream: None,
            ahead: entry.and_then(|e| e.ahead),
            behind: entry.and_then(|e| e.behind),
            additions: entry.and_then(|e| e.additions).unwrap_or(0),
            deletions: entry.and_then(|e| e.deletions).unwrap_or(0),
            dirty: entry.map(|e| e.dirty).unwrap_or(false),
            pr: entry.and_then(|e| {
                Some(model::PullRequestInfo {
                    number: e.pr_number?,
                    title: e.pr_title.clone()?,
                    state: e.pr_state.clone()?,
                    base: e.pr_base.clone()?,
                    url: e.pr_url.clone()?,
                })
            }),
            checks: entry.and_then(|e| e.checks()),
            changes_target,
            changes_added,
            changes_deleted,
            fresh: Freshness::all_stale(),
            cache_key: key,
            head: wt.head,
            branch: wt.branch,
            path: wt.path,
        });
    }

    statuses.sort_by_key(|s| std::cmp::Reverse(s.last_commit_ts));
    Ok(statuses)
}

/// Fill in data derivable purely from the local repository: commit
/// timestamp, upstream tracking ref, ahead/behind vs. the default branch,
/// and line-diff stats against that target. No network access.
pub fn refresh_local(repo: &Repository, status: &mut WorktreeStatus) {
    status.last_commit_ts = repo.last_commit_ts(&status.path);

    let (additions, deletions, dirty) = repo.diff_counts(&status.path);
    status.additions = additions as u32;
    status.deletions = deletions as u32;
    status.dirty = dirty;

    let Some(branch) = status.branch.clone() else {
        status.upstream = None;
        status.ahead = None;
        status.behind = None;
        status.fresh.changes = true;
        return;
    };

    status.upstream = repo.upstream(&branch);

    let default_branch = repo.default_branch();
    // Comparison target selection: prefer a cached PR base, else "main" if it
    // resolves, else the default branch.
    let target = status.changes_target.clone().unwrap_or_else(|| {
        if repo.resolve_ref("main").is_some() {
            "main".to_string()
        } else {
            default_branch.clone()
        }
    });

    let target_ref = repo
        .resolve_ref(&target)
        .or_else(|| repo.resolve_ref(&format!("origin/{target}")))
        .or_else(|| repo.resolve_ref(&default_branch));

    if let Some(target_ref) = target_ref
        && let Ok((added, deleted)) = repo.diff_stats(&target_ref, &branch)
    {
        status.changes_added = Some(added as u32);
        status.changes_deleted = Some(deleted as u32);
        status.changes_target = Some(target);
    }

    status.fresh.changes = true;
}

/// Fill in ahead/behind counts against `upstream` (after the caller has run
/// `sync_repo`). Requires network for the preceding fetch, not for this call.
pub fn refresh_pull_push(repo: &Repository, status: &mut WorktreeStatus) {
    let Some(branch) = status.branch.clone() else {
        status.ahead = None;
        status.behind = None;
        status.fresh.pull_push = true;
        return;
    };

    match repo.upstream(&branch) {
        Some(upstream) => {
            if let Ok((ahead, behind)) = repo.ahead_behind(&branch, &upstream) {
                status.ahead = Some(ahead as u32);
                status.behind = Some(behind as u32);
            }
            status.upstream = Some(upstream);
        }
        None => {
            status.ahead = None;
            status.behind = None;
            status.upstream = None;
        }
    }
    status.fresh.pull_push = true;
}

/// Fill in the pull-request and CI-check sections from a pre-fetched PR map.
pub fn refresh_forge(
    repo_root: &Path,
    status: &mut WorktreeStatus,
    pr_by_branch: &std::collections::HashMap<String, model::PullRequestInfo>,
) {
    let Some(branch) = status.branch.clone() else {
        status.pr = None;
        status.checks = None;
        status.fresh.pr = true;
        status.fresh.checks = true;
        return;
    };

    status.pr = pr_by_branch.get(&branch).cloned();
    status.fresh.pr = true;

    status.checks = status
        .pr
        .as_ref()
        .and_then(|pr| forge::checks_rollup(repo_root, pr.number).ok());
    status.fresh.checks = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_empty_cache_marks_all_stale() {
        let status = WorktreeStatus {
            path: "/tmp/repo".into(),
            branch: Some("main".into()),
            head: "abc".into(),
            cache_key: "main".into(),
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
        };
        assert!(!status.fresh.pull_push);
        assert!(!status.fresh.changes);
    }
}
