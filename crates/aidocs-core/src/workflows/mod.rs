//! The doc branch lifecycle workflows
//!
//! Each workflow checks its preconditions without touching the repository,
//! then builds a [`Pipeline`](crate::plan::Pipeline) of named steps and runs
//! it. Dry runs stop after the checks and only announce the steps.

pub mod clean;
pub mod init;
pub mod pull;
pub mod push;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};
use std::time::Duration;

use aidocs_fs::{Linker, copy, link};
use aidocs_git::{GitRepo, GitRunner, RetryPolicy};

use crate::progress::ProgressSink;
use crate::settings::Settings;
use crate::{Error, Result};

/// Message of the root commit on a fresh doc branch.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial AI docs commit";

/// Timestamp format used in commit messages.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Collaborators shared by every workflow.
pub struct Context<'a, R> {
    repo: &'a GitRepo<R>,
    linker: &'a dyn Linker,
    sink: &'a dyn ProgressSink,
    retry_unit: Duration,
}

impl<'a, R: GitRunner> Context<'a, R> {
    pub fn new(repo: &'a GitRepo<R>, linker: &'a dyn Linker, sink: &'a dyn ProgressSink) -> Self {
        Self {
            repo,
            linker,
            sink,
            retry_unit: RetryPolicy::default().unit,
        }
    }

    /// Override the wait between push attempts (tests use zero).
    pub fn with_retry_unit(mut self, unit: Duration) -> Self {
        self.retry_unit = unit;
        self
    }

    pub fn repo(&self) -> &GitRepo<R> {
        self.repo
    }

    pub fn sink(&self) -> &dyn ProgressSink {
        self.sink
    }

    pub fn root(&self) -> &Path {
        self.repo.root()
    }

    pub fn retry_policy(&self, settings: &Settings) -> RetryPolicy {
        RetryPolicy::new(settings.push_max_attempts, self.retry_unit)
    }

    /// Absolute location of `rel` in the main working tree.
    fn main_path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub(crate) fn require_repository(&self) -> Result<()> {
        if self.repo.is_repository() {
            Ok(())
        } else {
            Err(Error::NotARepository {
                path: self.root().to_path_buf(),
            })
        }
    }

    /// Both the doc branch and the worktree directory must exist.
    pub(crate) fn require_initialized(&self, settings: &Settings) -> Result<()> {
        if !self.repo.branch_exists(settings.doc_branch()) {
            return Err(Error::NotInitialized {
                what: format!("Doc branch '{}'", settings.doc_branch()),
            });
        }
        if !settings.worktree_path(self.root()).exists() {
            return Err(Error::NotInitialized {
                what: format!("Worktree directory '{}'", settings.worktree_dir),
            });
        }
        Ok(())
    }

    /// Push the doc branch from `dir` with the configured retry limit.
    fn push_doc_branch(&self, dir: &Path, settings: &Settings) -> Result<()> {
        let sink = self.sink;
        let policy = self.retry_policy(settings);
        policy.run(
            || self.repo.push(dir, &settings.remote, settings.doc_branch()),
            |err, wait| {
                sink.warn(&format!(
                    "Push failed ({err}); retrying in {}s",
                    wait.as_secs_f32()
                ));
            },
        )?;
        Ok(())
    }

    /// Remove the worktree directory through git, falling back to deleting it
    /// from disk. Stale administrative records are pruned either way.
    fn detach_worktree(&self, settings: &Settings) -> Result<()> {
        let path = settings.worktree_path(self.root());
        if let Err(e) = self.repo.worktree_remove(settings.worktree_dir.as_str()) {
            tracing::warn!(path = %path.display(), error = %e, "git worktree remove failed; deleting directory");
            self.sink.info("Attempting manual removal");
            copy::remove_path(&path)?;
        }
        self.prune_worktrees();
        Ok(())
    }

    fn prune_worktrees(&self) {
        if let Err(e) = self.repo.worktree_prune() {
            tracing::debug!(error = %e, "Worktree prune failed");
        }
    }

    /// Replace every link at a context path with a real copy of its target.
    fn materialize_links(&self, settings: &Settings) -> Result<()> {
        for rel in settings.context_paths() {
            let path = self.main_path(rel.as_str());
            if link::materialize(&path)? {
                self.sink.info(&format!("Materialized link: {rel}"));
            }
        }
        Ok(())
    }
}

/// Current local time in the commit message format.
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Whether anything (file, directory or link, even dangling) is at `path`.
fn occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Stage everything in the worktree and report whether there is anything to
/// commit.
fn stage_worktree<R: GitRunner>(ctx: &Context<'_, R>, worktree: &Path) -> Result<bool> {
    ctx.repo.add_all(worktree)?;
    Ok(ctx.repo.has_uncommitted_changes(worktree))
}
