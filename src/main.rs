use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use worktrunk::cache::CacheStore;
use worktrunk::config::WtConfig;
use worktrunk::facade::Facade;
use worktrunk::git::Repository;
use worktrunk::scheduler::Scheduler;

mod display;
mod tui;
mod verbose_log;

#[derive(Parser)]
#[command(name = "wt", about = "Git worktree management with live status aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the status table once and exit.
    List,
    /// Print detailed status for the current or named worktree.
    Info { target: Option<String> },
    /// Create a new worktree for `branch`.
    New { branch: String },
    /// Delete a worktree.
    Delete { target: Option<String> },
    /// Delete every worktree whose branch has been merged.
    DeleteMerged,
    /// Delete every worktree with no upstream.
    DeleteNoUpstream,
    /// Rename a branch and its worktree.
    Rename { old: Option<String>, new: String },
    /// Pull the target worktree's branch.
    Pull { target: Option<String> },
    /// Push the target worktree's branch.
    Push { target: Option<String> },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    verbose_log::init();

    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let repo = Repository::discover(&cwd).context("not inside a git repository")?;
    let config = WtConfig::load(repo.root())?;
    let cache = CacheStore::open(repo.root()).context("failed to open cache database")?;

    match cli.command {
        None => {
            let facade = Arc::new(Facade::new(repo, cache));
            let scheduler = Scheduler::new(facade.clone(), config.max_workers);
            if let Some(path) = tui::run(facade, scheduler)? {
                write_selected_path(&path)?;
            }
            Ok(())
        }
        Some(Command::List) => {
            let facade = Arc::new(Facade::new(repo, cache));
            let scheduler = Scheduler::new(facade.clone(), config.max_workers);
            scheduler.seed_from_cache().ok();
            scheduler.request_refresh();
            for status in facade.snapshot() {
                println!("{}\t{}", status.display_branch(), status.path.display());
            }
            Ok(())
        }
        Some(Command::Info { target }) => {
            let facade = Arc::new(Facade::new(repo, cache));
            let scheduler = Scheduler::new(facade.clone(), 4);
            scheduler.seed_from_cache().ok();
            scheduler.request_refresh();
            let statuses = facade.snapshot();
            let status = match &target {
                Some(t) => statuses.iter().find(|s| s.display_branch() == t),
                None => statuses.first(),
            };
            match status {
                Some(s) => {
                    println!("path: {}", s.path.display());
                    println!("branch: {}", s.display_branch());
                    println!("upstream: {}", s.upstream.as_deref().unwrap_or("none"));
                    println!("ahead/behind: {:?}/{:?}", s.ahead, s.behind);
                    println!("dirty: {}", s.dirty);
                    Ok(())
                }
                None => anyhow::bail!("no matching worktree"),
            }
        }
        Some(Command::New { branch }) => {
            let facade = Facade::new(repo, cache);
            let path = facade.new_worktree(&branch)?;
            println!("{}", path.display());
            Ok(())
        }
        Some(Command::Delete { target }) => {
            let facade = Facade::new(repo, cache);
            facade.delete(target.map(PathBuf::from).as_deref())?;
            Ok(())
        }
        Some(Command::DeleteMerged) => {
            let facade = Facade::new(repo, cache);
            for path in facade.delete_merged()? {
                println!("deleted {}", path.display());
            }
            Ok(())
        }
        Some(Command::DeleteNoUpstream) => {
            let facade = Facade::new(repo, cache);
            for path in facade.delete_no_upstream()? {
                println!("deleted {}", path.display());
            }
            Ok(())
        }
        Some(Command::Rename { old, new }) => {
            let facade = Arc::new(Facade::new(repo, cache));
            let old = match old {
                Some(old) => old,
                None => facade
                    .repo()
                    .current_worktree(&cwd)
                    .and_then(|wt| wt.branch)
                    .context("not on a branch; specify the branch to rename explicitly")?,
            };
            let path = facade.rename(&old, &new)?;
            println!("{}", path.display());
            Ok(())
        }
        Some(Command::Pull { target }) => {
            let facade = Facade::new(repo, cache);
            facade.pull(target.map(PathBuf::from).as_deref())?;
            Ok(())
        }
        Some(Command::Push { target }) => {
            let facade = Facade::new(repo, cache);
            facade.push(target.map(PathBuf::from).as_deref())?;
            Ok(())
        }
    }
}

fn write_selected_path(path: &std::path::Path) -> anyhow::Result<()> {
    match worktrunk::config::output_file_override() {
        Some(output_path) => {
            std::fs::write(&output_path, path.to_string_lossy().as_bytes())
                .with_context(|| format!("failed to write {}", output_path.display()))?;
        }
        None => println!("{}", path.display()),
    }
    Ok(())
}
