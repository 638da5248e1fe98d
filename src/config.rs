//! Layered configuration: built-in defaults, overridden by an optional
//! per-repo `.config/wt.toml`, overridden by environment variables.
//!
//! Unlike a user-level config shared across repositories, this file lives
//! inside the repository it configures and is meant to be checked into git
//! so every worktree sees the same settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Project-level configuration, loaded from `<repo>/.config/wt.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WtConfig {
    /// Branch to diff worktrees against when no PR base is known yet.
    #[serde(rename = "default-branch")]
    pub default_branch: Option<String>,

    /// Poll interval for the background refresh loop, in milliseconds.
    #[serde(rename = "refresh-interval-ms")]
    pub refresh_interval_ms: u64,

    /// Upper bound on concurrent refresh workers, before the
    /// `min(32, 4 * cpu_count, worktrees)` cap is applied.
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Skip all `gh` calls even if the CLI is available.
    #[serde(rename = "forge-disabled")]
    pub forge_disabled: bool,
}

impl Default for WtConfig {
    fn default() -> Self {
        Self {
            default_branch: None,
            refresh_interval_ms: 5_000,
            max_workers: 32,
            forge_disabled: false,
        }
    }
}

impl WtConfig {
    /// Load defaults, then `<repo_root>/.config/wt.toml` if present, then
    /// environment variable overrides (`WT_REFRESH_INTERVAL_MS`,
    /// `WT_MAX_WORKERS`, `WT_FORGE_DISABLED`, `WT_DEFAULT_BRANCH`).
    pub fn load(repo_root: &Path) -> anyhow::Result<Self> {
        let mut config = match Self::read_file(repo_root) {
            Some(contents) => toml::from_str(&contents)?,
            None => Self::default(),
        };

        if let Ok(branch) = std::env::var("WT_DEFAULT_BRANCH") {
            config.default_branch = Some(branch);
        }
        if let Ok(ms) = std::env::var("WT_REFRESH_INTERVAL_MS")
            && let Ok(ms) = ms.parse()
        {
            config.refresh_interval_ms = ms;
        }
        if let Ok(n) = std::env::var("WT_MAX_WORKERS")
            && let Ok(n) = n.parse()
        {
            config.max_workers = n;
        }
        if let Ok(flag) = std::env::var("WT_FORGE_DISABLED") {
            config.forge_disabled = flag == "1" || flag.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    fn read_file(repo_root: &Path) -> Option<String> {
        let path = repo_root.join(".config").join("wt.toml");
        std::fs::read_to_string(path).ok()
    }

    /// Number of refresh workers to spawn for a given worktree count.
    pub fn worker_count(&self, cpu_count: usize, worktree_count: usize) -> usize {
        self.max_workers
            .min(4 * cpu_count.max(1))
            .min(worktree_count.max(1))
    }
}

/// Where the rendered output should be written, if `GW_OUTPUT_FILE` was set.
/// Used by the non-interactive fallback path when stdout is not a TTY.
pub fn output_file_override() -> Option<std::path::PathBuf> {
    std::env::var_os("GW_OUTPUT_FILE").map(std::path::PathBuf::from)
}
