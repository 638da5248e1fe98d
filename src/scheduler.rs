//! The refresh scheduler: fans probes out across a bounded worker pool, then
//! applies results back onto the [`crate::facade::Facade`] one at a time.
//!
//! Ordering per the concurrency model: within one worktree, the local stage
//! completes before the remote stage begins. Across worktrees, no ordering
//! is promised. A debounced re-kick flag absorbs refresh requests that
//! arrive while a cycle is already running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::aggregator;
use crate::facade::Facade;
use crate::forge;
use crate::model::WorktreeStatus;

/// Bounded pool size per the fan-out policy: `min(32, 4 * cpu_count, worktrees)`.
pub fn worker_count(cpu_count: usize, worktree_count: usize, max_workers: usize) -> usize {
    max_workers
        .min(4 * cpu_count.max(1))
        .min(worktree_count.max(1))
        .max(1)
}

/// Drives refresh cycles against a shared [`Facade`]. `Clone`able; every
/// clone shares the same stop flag and re-kick state.
#[derive(Clone)]
pub struct Scheduler {
    facade: Arc<Facade>,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    pending: Arc<AtomicBool>,
    max_workers: usize,
}

impl Scheduler {
    pub fn new(facade: Arc<Facade>, max_workers: usize) -> Self {
        Self {
            facade,
            stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            pending: Arc::new(AtomicBool::new(false)),
            max_workers,
        }
    }

    /// Set on TUI exit; honoured between probes, not mid-subprocess.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Load the cache synchronously and seed the facade with stale rows.
    /// Must complete before the first frame is drawn.
    pub fn seed_from_cache(&self) -> anyhow::Result<()> {
        let statuses = aggregator::placeholder(self.facade.repo(), self.facade.cache())?;
        self.facade.set_statuses(statuses, true);
        Ok(())
    }

    /// Request a refresh. If one is already running, sets the re-kick flag
    /// and returns without blocking; the running cycle will run once more
    /// on completion. Otherwise spawns the cycle on a background thread and
    /// returns immediately, so the caller (the TUI event loop) stays
    /// responsive for the full duration of the network fetches inside it.
    pub fn request_refresh(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            self.pending.store(true, Ordering::SeqCst);
            return;
        }
        let this = self.clone();
        std::thread::spawn(move || this.run_cycle());
    }

    /// Block until no cycle is running. Used by the non-interactive fallback,
    /// which has no event loop to keep responsive, and by tests that need to
    /// observe the result of a refresh synchronously.
    pub fn wait_idle(&self) {
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    fn run_cycle(&self) {
        loop {
            self.pending.store(false, Ordering::SeqCst);
            self.run_local_then_remote();
            if self.is_stopped() || !self.pending.load(Ordering::SeqCst) {
                break;
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    fn run_local_then_remote(&self) {
        let repo = self.facade.repo();
        let snapshot = self.facade.snapshot();
        if snapshot.is_empty() {
            return;
        }

        let n_workers = worker_count(num_cpus(), snapshot.len(), self.max_workers);

        // Local stage: no network, runs on a bounded scoped-thread pool.
        let local_results: Vec<WorktreeStatus> = std::thread::scope(|scope| {
            let chunks = chunk(snapshot, n_workers);
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .into_iter()
                            .map(|mut status| {
                                aggregator::refresh_local(repo, &mut status);
                                status
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        for status in &local_results {
            self.facade.update_status(status.clone(), true);
            let now = parse_epoch(&crate::utils::now_iso8601());
            let changes = match (&status.changes_target, status.changes_added, status.changes_deleted) {
                (Some(target), Some(added), Some(deleted)) => Some((target.as_str(), added, deleted)),
                _ => None,
            };
            let _ = self.facade.cache().upsert_changes(
                &status.cache_key,
                &status.path,
                status.last_commit_ts,
                status.additions,
                status.deletions,
                status.dirty,
                changes,
                now,
            );
        }

        if self.is_stopped() {
            return;
        }

        // Remote stage: network-dependent; skip entirely when the forge CLI
        // isn't available, leaving PR/check fields null but still "fresh".
        let forge_available = forge::is_available(repo.root());
        let pr_by_branch = if forge_available {
            forge::pull_requests(repo.root()).unwrap_or_default()
        } else {
            Default::default()
        };
        let _ = repo.sync_repo();

        let n_workers = worker_count(num_cpus(), local_results.len(), self.max_workers);
        let repo_root = repo.root().to_path_buf();
        let remote_results: Vec<WorktreeStatus> = std::thread::scope(|scope| {
            let chunks = chunk(local_results, n_workers);
            let pr_by_branch = &pr_by_branch;
            let repo_root = &repo_root;
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .into_iter()
                            .map(|mut status| {
                                aggregator::refresh_pull_push(repo, &mut status);
                                if forge_available {
                                    aggregator::refresh_forge(repo_root, &mut status, pr_by_branch);
                                }
                                status
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        for status in remote_results {
            let now = parse_epoch(&crate::utils::now_iso8601());
            if let (Some(ahead), Some(behind)) = (status.ahead, status.behind) {
                let _ = self.facade.cache().upsert_pull_push(
                    &status.cache_key,
                    &status.path,
                    ahead,
                    behind,
                    now,
                );
            }
            let pr_tuple = status
                .pr
                .as_ref()
                .map(|pr| (pr.title.as_str(), pr.state.as_str(), pr.base.as_str(), pr.url.as_str(), pr.number));
            let _ = self.facade.cache().upsert_pr_and_checks(
                &status.cache_key,
                &status.path,
                pr_tuple,
                status.checks,
                now,
            );
            self.facade.update_status(status, true);
        }
    }
}

fn chunk<T>(items: Vec<T>, n_workers: usize) -> Vec<Vec<T>> {
    let n_workers = n_workers.max(1);
    let mut buckets: Vec<Vec<T>> = (0..n_workers).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        buckets[i % n_workers].push(item);
    }
    buckets.into_iter().filter(|b| !b.is_empty()).collect()
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn parse_epoch(iso: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}
