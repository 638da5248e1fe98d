//! Table formatting for the worktree screen: fixed-width columns, per-cell
//! staleness dimming, and OSC 8 hyperlinks on the PR cell.

use worktrunk::model::WorktreeStatus;
use worktrunk::styling::{hyperlink_stdout, truncate_visible};

pub const BRANCH_WIDTH: usize = 40;
pub const LAST_COMMIT_WIDTH: usize = 20;
pub const UPSTREAM_WIDTH: usize = 12;
pub const CHANGES_WIDTH: usize = 38;
pub const PR_WIDTH: usize = 10;

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Relative commit age bucketed at 60s/3600s/86400s/604800s/2629800s (1mo).
pub fn format_commit_age(timestamp: i64, now: i64) -> String {
    if timestamp == 0 {
        return "unknown".to_string();
    }
    let elapsed = (now - timestamp).max(0);
    const MINUTE: i64 = 60;
    const HOUR: i64 = 3600;
    const DAY: i64 = 86400;
    const WEEK: i64 = 604_800;
    const MONTH: i64 = 2_629_800;

    if elapsed < MINUTE {
        format!("{elapsed}s ago")
    } else if elapsed < HOUR {
        format!("{}m ago", elapsed / MINUTE)
    } else if elapsed < DAY {
        format!("{}h ago", elapsed / HOUR)
    } else if elapsed < WEEK {
        format!("{}d ago", elapsed / DAY)
    } else if elapsed < MONTH {
        format!("{}w ago", elapsed / WEEK)
    } else {
        format!("{}mo ago", elapsed / MONTH)
    }
}

fn fit(text: &str, width: usize) -> String {
    let truncated = truncate_visible(text, width, "…");
    format!("{truncated:<width$}")
}

fn format_upstream(status: &WorktreeStatus) -> String {
    match (status.ahead, status.behind) {
        (Some(0), Some(0)) => "up to date".to_string(),
        (Some(ahead), Some(behind)) => format!("+{ahead} -{behind}"),
        _ => "n/a".to_string(),
    }
}

fn format_changes(status: &WorktreeStatus) -> String {
    match (status.changes_added, status.changes_deleted, &status.changes_target) {
        (Some(added), Some(deleted), Some(target)) => {
            format!("+{added} -{deleted} vs {target}")
        }
        _ => "n/a".to_string(),
    }
}

fn format_pr(status: &WorktreeStatus, hyperlinks: bool) -> String {
    let Some(pr) = &status.pr else {
        return String::new();
    };
    let label = format!("#{}", pr.number);
    if hyperlinks {
        hyperlink_stdout(&pr.url, &label)
    } else {
        label
    }
}

/// The five fixed-width, un-styled columns for one row.
pub fn format_columns(status: &WorktreeStatus, now: i64, hyperlinks: bool) -> [String; 5] {
    [
        fit(status.display_branch(), BRANCH_WIDTH),
        fit(&format_commit_age(status.last_commit_ts, now), LAST_COMMIT_WIDTH),
        fit(&format_upstream(status), UPSTREAM_WIDTH),
        fit(&format_changes(status), CHANGES_WIDTH),
        fit(&format_pr(status, hyperlinks), PR_WIDTH),
    ]
}

/// Header row, unstyled.
pub fn header_line() -> String {
    [
        fit("BRANCH", BRANCH_WIDTH),
        fit("LAST COMMIT", LAST_COMMIT_WIDTH),
        fit("UPSTREAM", UPSTREAM_WIDTH),
        fit("CHANGES", CHANGES_WIDTH),
        fit("PR", PR_WIDTH),
    ]
    .join(" ")
}

pub fn separator_line() -> String {
    "-".repeat(BRANCH_WIDTH + LAST_COMMIT_WIDTH + UPSTREAM_WIDTH + CHANGES_WIDTH + PR_WIDTH + 4)
}

/// One data row. Columns whose section is still stale are dimmed; the
/// branch cell is never dimmed.
pub fn format_row(status: &WorktreeStatus, now: i64, selected: bool, hyperlinks: bool) -> String {
    let columns = format_columns(status, now, hyperlinks);
    let stale_flags = [
        false,
        !status.fresh.changes,
        !status.fresh.pull_push,
        !status.fresh.changes,
        !status.fresh.pr || !status.fresh.checks,
    ];

    let rendered: Vec<String> = columns
        .into_iter()
        .zip(stale_flags)
        .map(|(cell, dim)| if dim { format!("{DIM}{cell}{RESET}") } else { cell })
        .collect();

    let prefix = if selected { "> " } else { "  " };
    format!("{prefix}{}", rendered.join(" "))
}
