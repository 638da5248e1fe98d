//! The on-disk cache store.
//!
//! One sqlite database per repository, keyed by the sha1 of the repository
//! root so two checkouts of the same repo don't collide. Schema evolution is
//! additive: `ensure_schema` adds missing columns to an existing table
//! rather than requiring migrations.
//!
//! The connection is behind a `Mutex` so `CacheStore` is `Sync`: the refresh
//! scheduler's background thread and the facade's caller both hold the same
//! `Arc<Facade>`, and a single sqlite connection isn't safe to touch from
//! more than one thread at a time without external serialization.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use crate::model::{CheckState, ChecksInfo};

/// A cached row of worktree metadata, keyed by [`crate::model::cache_key`].
#[derive(Debug, Clone, Default)]
pub struct CachedEntry {
    pub last_commit_ts: Option<i64>,
    /// Commits the local branch is ahead of its upstream.
    pub ahead: Option<u32>,
    /// Commits the local branch is behind its upstream.
    pub behind: Option<u32>,
    pub additions: Option<u32>,
    pub deletions: Option<u32>,
    pub dirty: bool,
    pub changes_target: Option<String>,
    pub changes_added: Option<u32>,
    pub changes_deleted: Option<u32>,
    pub pr_number: Option<u64>,
    pub pr_title: Option<String>,
    pub pr_state: Option<String>,
    pub pr_base: Option<String>,
    pub pr_url: Option<String>,
    pub checks_passed: Option<u32>,
    pub checks_total: Option<u32>,
    pub checks_state: Option<String>,
}

impl CachedEntry {
    pub fn checks(&self) -> Option<ChecksInfo> {
        let passed = self.checks_passed?;
        let total = self.checks_total?;
        let state = self.checks_state.as_deref().map(|s| match s {
            "ok" => CheckState::Ok,
            "fail" => CheckState::Failed,
            _ => CheckState::Pending,
        });
        Some(ChecksInfo { passed, total, state })
    }
}

/// A connection to a single repository's cache database.
pub struct CacheStore {
    conn: Mutex<Connection>,
}

const COLUMNS: &[(&str, &str)] = &[
    ("path", "TEXT"),
    ("last_commit_ts", "INTEGER"),
    ("ahead", "INTEGER"),
    ("behind", "INTEGER"),
    ("additions", "INTEGER"),
    ("deletions", "INTEGER"),
    ("dirty", "INTEGER"),
    ("pull_push_validated_at", "INTEGER"),
    ("changes_target", "TEXT"),
    ("changes_added", "INTEGER"),
    ("changes_deleted", "INTEGER"),
    ("changes_validated_at", "INTEGER"),
    ("pr_number", "INTEGER"),
    ("pr_title", "TEXT"),
    ("pr_state", "TEXT"),
    ("pr_base", "TEXT"),
    ("pr_url", "TEXT"),
    ("pr_validated_at", "INTEGER"),
    ("checks_passed", "INTEGER"),
    ("checks_total", "INTEGER"),
    ("checks_state", "TEXT"),
    ("checks_validated_at", "INTEGER"),
];

impl CacheStore {
    /// Open (creating if needed) the cache database for `repo_root`, stored at
    /// `${HOME}/.cache/wt/<sha1(repo_root)>.db`.
    pub fn open(repo_root: &Path) -> rusqlite::Result<Self> {
        let path = db_path(repo_root);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self::open_at(&path)
    }

    /// Open a database at an explicit path. Used directly by tests.
    pub fn open_at(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        ensure_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn get(&self, key: &str) -> rusqlite::Result<Option<CachedEntry>> {
        self.conn
            .lock()
            .unwrap()
            .query_row(
                "SELECT last_commit_ts, ahead, behind, additions, deletions, dirty,
                        changes_target, changes_added, changes_deleted,
                        pr_number, pr_title, pr_state, pr_base, pr_url,
                        checks_passed, checks_total, checks_state
                 FROM worktree_cache WHERE cache_key = ?1",
                params![key],
                |row| {
                    Ok(CachedEntry {
                        last_commit_ts: row.get(0)?,
                        ahead: row.get(1)?,
                        behind: row.get(2)?,
                        additions: row.get(3)?,
                        deletions: row.get(4)?,
                        dirty: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
                        changes_target: row.get(6)?,
                        changes_added: row.get(7)?,
                        changes_deleted: row.get(8)?,
                        pr_number: row.get(9)?,
                        pr_title: row.get(10)?,
                        pr_state: row.get(11)?,
                        pr_base: row.get(12)?,
                        pr_url: row.get(13)?,
                        checks_passed: row.get(14)?,
                        checks_total: row.get(15)?,
                        checks_state: row.get(16)?,
                    })
                },
            )
            .optional()
    }

    pub fn load_all(&self) -> rusqlite::Result<std::collections::HashMap<String, CachedEntry>> {
        let keys: Vec<String> = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare("SELECT cache_key FROM worktree_cache")?;
            stmt.query_map([], |row| row.get(0))?.collect::<rusqlite::Result<_>>()?
        };
        let mut out = std::collections::HashMap::new();
        for key in keys {
            if let Some(entry) = self.get(&key)? {
                out.insert(key, entry);
            }
        }
        Ok(out)
    }

    pub fn upsert_path(&self, key: &str, path: &Path) -> rusqlite::Result<()> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO worktree_cache (cache_key, path) VALUES (?1, ?2)
             ON CONFLICT(cache_key) DO UPDATE SET path = excluded.path",
            params![key, path.to_string_lossy()],
        )?;
        Ok(())
    }

    pub fn upsert_pull_push(&self, key: &str, path: &Path, ahead: u32, behind: u32, now: i64) -> rusqlite::Result<()> {
        self.conn.lock().unwrap().execute(
            "INSERT INTO worktree_cache (cache_key, path, ahead, behind, pull_push_validated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(cache_key) DO UPDATE SET
               path = excluded.path, ahead = excluded.ahead, behind = excluded.behind,
               pull_push_validated_at = excluded.pull_push_validated_at",
            params![key, path.to_string_lossy(), ahead, behind, now],
        )?;
        Ok(())
    }

    /// Persists both the no-target working-tree diff (`additions`/`deletions`/
    /// `dirty`) and the comparison-target diff (`changes_target`/
    /// `changes_added`/`changes_deleted`), plus `last_commit_ts`, all from one
    /// local-stage refresh. The three `changes_*` columns are only ever
    /// written together, so a later read sees them as all-`Some` or all-`None`.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_changes(
        &self,
        key: &str,
        path: &Path,
        last_commit_ts: i64,
        additions: u32,
        deletions: u32,
        dirty: bool,
        changes: Option<(&str, u32, u32)>, // (target, added, deleted)
        now: i64,
    ) -> rusqlite::Result<()> {
        let (changes_target, changes_added, changes_deleted) = match changes {
            Some((target, added, deleted)) => (Some(target), Some(added), Some(deleted)),
            None => (None, None, None),
        };
        self.conn.lock().unwrap().execute(
            "INSERT INTO worktree_cache (
               cache_key, path, last_commit_ts, additions, deletions, dirty,
               changes_target, changes_added, changes_deleted, changes_validated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(cache_key) DO UPDATE SET
               path = excluded.path, last_commit_ts = excluded.last_commit_ts,
               additions = excluded.additions, deletions = excluded.deletions,
               dirty = excluded.dirty,
               changes_target = excluded.changes_target, changes_added = excluded.changes_added,
               changes_deleted = excluded.changes_deleted,
               changes_validated_at = excluded.changes_validated_at",
            params![
                key,
                path.to_string_lossy(),
                last_commit_ts,
                additions,
                deletions,
                dirty as i64,
                changes_target,
                changes_added,
                changes_deleted,
                now
            ],
        )?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn upsert_pr_and_checks(
        &self,
        key: &str,
        path: &Path,
        pr: Option<(&str, &str, &str, &str, u64)>, // (title, state, base, url, number)
        checks: Option<ChecksInfo>,
        now: i64,
    ) -> rusqlite::Result<()> {
        let (pr_number, pr_title, pr_state, pr_base, pr_url) = match pr {
            Some((title, state, base, url, number)) => (
                Some(number as i64),
                Some(title),
                Some(state),
                Some(base),
                Some(url),
            ),
            None => (None, None, None, None, None),
        };
        let (checks_passed, checks_total, checks_state) = match checks {
            Some(c) => (
                Some(c.passed),
                Some(c.total),
                Some(c.state.map(|s| s.as_str()).unwrap_or("pend").to_string()),
            ),
            None => (None, None, None),
        };
        self.conn.lock().unwrap().execute(
            "INSERT INTO worktree_cache (
               cache_key, path, pr_number, pr_title, pr_state, pr_base, pr_url, pr_validated_at,
               checks_passed, checks_total, checks_state, checks_validated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(cache_key) DO UPDATE SET
               path = excluded.path,
               pr_number = excluded.pr_number, pr_title = excluded.pr_title,
               pr_state = excluded.pr_state, pr_base = excluded.pr_base, pr_url = excluded.pr_url,
               pr_validated_at = excluded.pr_validated_at,
               checks_passed = excluded.checks_passed, checks_total = excluded.checks_total,
               checks_state = excluded.checks_state, checks_validated_at = excluded.checks_validated_at",
            params![
                key,
                path.to_string_lossy(),
                pr_number,
                pr_title,
                pr_state,
                pr_base,
                pr_url,
                now,
                checks_passed,
                checks_total,
                checks_state,
                now
            ],
        )?;
        Ok(())
    }
}

fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS worktree_cache (cache_key TEXT PRIMARY KEY)",
        [],
    )?;

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('worktree_cache')")?;
    let existing: std::collections::HashSet<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    drop(stmt);

    for (name, ty) in COLUMNS {
        if !existing.contains(*name) {
            conn.execute(
                &format!("ALTER TABLE worktree_cache ADD COLUMN {name} {ty}"),
                [],
            )?;
        }
    }
    Ok(())
}

fn db_path(repo_root: &Path) -> PathBuf {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(repo_root.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();

    let home = crate::path::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join("wt").join(format!("{hex}.db"))
}
