//! The forge adapter: wraps the `gh` CLI for pull-request and CI-check data.
//!
//! Queries are batched per repository rather than issued per-branch: one
//! `gh pr list` covers every worktree's branch in a single round trip, keyed
//! by `headRefName`.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::git::parse_owner_repo;
use crate::model::{CheckState, ChecksInfo, PullRequestInfo};
use crate::shell_exec::run;

/// The `owner/repo` slug for `origin`, if the remote is configured and its
/// URL parses. Passed to `gh` explicitly so pull requests are scoped to this
/// repository rather than whatever `gh` infers from the working directory.
fn repo_slug(repo_root: &Path) -> Option<String> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_root).args(["remote", "get-url", "origin"]);
    let output = run(&mut cmd, Some("forge_remote_url")).ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let (owner, repo) = parse_owner_repo(&url)?;
    Some(format!("{owner}/{repo}"))
}

#[derive(Debug, Deserialize)]
struct RawPr {
    number: u64,
    state: String,
    #[serde(rename = "baseRefName")]
    base_ref_name: String,
    #[serde(rename = "mergedAt")]
    merged_at: Option<String>,
    url: String,
    title: String,
    #[serde(rename = "headRefName")]
    head_ref_name: String,
}

/// Is `gh` available and authenticated against a repo with a configured
/// remote? Callers should skip forge queries entirely when this is false.
pub fn is_available(repo_root: &Path) -> bool {
    let mut cmd = Command::new("gh");
    cmd.arg("-C").arg(repo_root).args(["auth", "status"]);
    run(&mut cmd, Some("gh_auth_status"))
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Fetch every open-or-closed pull request touching this repository and
/// index it by branch name, keeping the most recently updated PR per branch.
pub fn pull_requests(repo_root: &Path) -> anyhow::Result<HashMap<String, PullRequestInfo>> {
    let mut cmd = Command::new("gh");
    cmd.arg("-C").arg(repo_root).args([
        "pr",
        "list",
        "--state",
        "all",
        "--json",
        "number,state,baseRefName,mergedAt,url,title,headRefName",
        "--limit",
        "200",
    ]);
    if let Some(slug) = repo_slug(repo_root) {
        cmd.args(["--repo", &slug]);
    }
    let output = run(&mut cmd, Some("pull_requests"))?;
    if !output.status.success() {
        anyhow::bail!(
            "gh pr list failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let raw: Vec<RawPr> = serde_json::from_slice(&output.stdout)?;
    let mut by_branch = HashMap::new();
    for pr in raw {
        let state = if pr.merged_at.is_some() {
            "MERGED".to_string()
        } else {
            pr.state
        };
        by_branch.insert(
            pr.head_ref_name,
            PullRequestInfo {
                number: pr.number,
                title: pr.title,
                state,
                base: pr.base_ref_name,
                url: pr.url,
            },
        );
    }
    Ok(by_branch)
}

#[derive(Debug, Deserialize)]
struct CheckRun {
    conclusion: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckRollup {
    #[serde(rename = "statusCheckRollup", default)]
    status_check_rollup: Vec<CheckRun>,
}

/// Fetch and classify the CI check rollup for a single pull request.
pub fn checks_rollup(repo_root: &Path, pr_number: u64) -> anyhow::Result<ChecksInfo> {
    let mut cmd = Command::new("gh");
    cmd.arg("-C").arg(repo_root).args([
        "pr",
        "view",
        &pr_number.to_string(),
        "--json",
        "statusCheckRollup",
    ]);
    if let Some(slug) = repo_slug(repo_root) {
        cmd.args(["--repo", &slug]);
    }
    let output = run(&mut cmd, Some("checks_rollup"))?;
    if !output.status.success() {
        anyhow::bail!(
            "gh pr view failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let parsed: CheckRollup = serde_json::from_slice(&output.stdout)?;
    Ok(classify_checks(&parsed.status_check_rollup))
}

/// Classify a set of check runs into passed/total/overall state.
///
/// Overall state: `None` when there are no checks; `Failed` if any run
/// failed; else `Pending` if any run is incomplete; else `Ok`.
fn classify_checks(runs: &[CheckRun]) -> ChecksInfo {
    let total = runs.len() as u32;
    let mut passed = 0u32;
    let mut failed = false;
    let mut pending = false;

    for run in runs {
        if run.state.as_deref().is_some_and(|s| s != "COMPLETED") {
            pending = true;
        }
        match run.conclusion.as_deref() {
            None => pending = true,
            Some("SUCCESS" | "NEUTRAL" | "SKIPPED") => passed += 1,
            Some(_) => failed = true,
        }
    }

    let state = if total == 0 {
        None
    } else if failed {
        Some(CheckState::Failed)
    } else if pending {
        Some(CheckState::Pending)
    } else {
        Some(CheckState::Ok)
    };

    ChecksInfo { passed, total, state }
}
