//! Shared fixture: a throwaway git repository with an initial commit,
//! suitable for exercising the VCS adapter and everything built on it
//! without touching the host's real repositories.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use worktrunk::cache::CacheStore;
use worktrunk::git::Repository;

pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    /// `git init`, one commit on the default branch, `user.*` set so commits
    /// don't depend on the host's global git config.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        run(dir.path(), &["init", "--quiet", "--initial-branch=main"]);
        run(dir.path(), &["config", "user.email", "test@example.com"]);
        run(dir.path(), &["config", "user.name", "Test"]);
        std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        run(dir.path(), &["add", "README.md"]);
        run(dir.path(), &["commit", "--quiet", "-m", "initial"]);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> Repository {
        Repository::discover(self.path()).unwrap()
    }

    pub fn cache(&self) -> CacheStore {
        CacheStore::open_at(&self.path().join("cache.db")).unwrap()
    }

    pub fn git(&self, args: &[&str]) {
        run(self.path(), args);
    }

    /// Create a branch and a worktree for it under `<repo>/<branch>`.
    pub fn add_worktree(&self, branch: &str) -> std::path::PathBuf {
        let path = self.path().join(branch);
        run(
            self.path(),
            &["worktree", "add", "-b", branch, path.to_str().unwrap()],
        );
        path
    }
}

fn run(cwd: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed in {cwd:?}");
}
