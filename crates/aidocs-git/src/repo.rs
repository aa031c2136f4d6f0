//! Repository queries and commands
//!
//! [`GitRepo`] binds a [`GitRunner`] to the root of the main working tree.
//! Query methods never mutate the repository; command methods map a
//! non-zero exit to [`Error::CommandFailed`].

use std::path::{Path, PathBuf};

use crate::runner::{GitOutput, GitRunner};
use crate::{Error, Result, RetryPolicy};

/// A git repository driven through a [`GitRunner`].
#[derive(Debug, Clone)]
pub struct GitRepo<R> {
    runner: R,
    root: PathBuf,
}

impl<R: GitRunner> GitRepo<R> {
    /// Bind `runner` to the main working tree at `root`.
    pub fn new(runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    /// Root of the main working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run git in `dir`, failing on a non-zero exit.
    pub fn git_in(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        self.runner.run(dir, args)?.into_result(args)
    }

    /// Run git in the repository root, failing on a non-zero exit.
    pub fn git(&self, args: &[&str]) -> Result<GitOutput> {
        self.git_in(&self.root, args)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether a `.git` marker (directory, or file for linked worktrees)
    /// exists at the root.
    pub fn is_repository(&self) -> bool {
        self.root.join(".git").exists()
    }

    /// Whether a local branch named `name` exists.
    pub fn branch_exists(&self, name: &str) -> bool {
        let reference = format!("refs/heads/{name}");
        self.runner
            .run(&self.root, &["rev-parse", "--verify", "--quiet", &reference])
            .map(|output| output.success())
            .unwrap_or(false)
    }

    /// Name of the branch checked out in the main working tree.
    ///
    /// A detached HEAD has no name here and is reported as [`Error::Query`].
    pub fn current_branch(&self) -> Result<String> {
        let output = self
            .git(&["branch", "--show-current"])
            .map_err(|e| Error::Query {
                message: format!("cannot resolve HEAD: {e}"),
            })?;

        let name = output.stdout.trim();
        if name.is_empty() {
            return Err(Error::Query {
                message: "HEAD is detached; no current branch name".into(),
            });
        }
        Ok(name.to_string())
    }

    /// Whether `git status` in `dir` reports anything pending.
    ///
    /// An inconclusive status (the command fails) reports `false`.
    pub fn has_uncommitted_changes(&self, dir: &Path) -> bool {
        match self.git_in(dir, &["status", "--porcelain"]) {
            Ok(output) => !output.stdout.trim().is_empty(),
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Status query failed; assuming clean");
                false
            }
        }
    }

    /// Paths in `dir` whose tracked content differs from HEAD, staged or
    /// not. Untracked files are not listed.
    pub fn tracked_changes(&self, dir: &Path) -> Result<Vec<String>> {
        let output = self.git_in(dir, &["status", "--porcelain", "--untracked-files=no"])?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.get(3..))
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .collect())
    }

    /// Whether `path` (relative to the root) is part of the tree at the tip
    /// of `branch`.
    pub fn tracked_on(&self, branch: &str, path: &str) -> Result<bool> {
        let output = self.git(&["ls-tree", "--name-only", branch, "--", path])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// The identity configured as `user.name`, if any.
    pub fn configured_user_name(&self) -> Option<String> {
        self.git(&["config", "user.name"])
            .ok()
            .map(|output| output.stdout.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    // ------------------------------------------------------------------
    // Branch commands
    // ------------------------------------------------------------------

    /// Switch the main working tree to a new branch with no history and
    /// unstage everything that was tracked before.
    pub fn checkout_orphan(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "--orphan", branch])?;
        self.git(&["reset", "--quiet"])?;
        Ok(())
    }

    /// Switch the main working tree to `branch`, refusing to discard changes.
    pub fn switch(&self, branch: &str) -> Result<()> {
        self.git(&["switch", branch])?;
        Ok(())
    }

    /// Forcibly switch the main working tree to `branch`.
    pub fn switch_force(&self, branch: &str) -> Result<()> {
        self.git(&["switch", "--force", branch])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.git(&["branch", "-D", branch])?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Index and commits
    // ------------------------------------------------------------------

    /// Stage `path` in the root even if it is ignored.
    pub fn add_force(&self, path: &str) -> Result<()> {
        self.git(&["add", "--force", "--", path])?;
        Ok(())
    }

    /// Stage every change in `dir`.
    pub fn add_all(&self, dir: &Path) -> Result<()> {
        self.git_in(dir, &["add", "--all"])?;
        Ok(())
    }

    pub fn commit(&self, dir: &Path, message: &str, allow_empty: bool) -> Result<()> {
        let mut args = vec!["commit", "--quiet", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.git_in(dir, &args)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Remote
    // ------------------------------------------------------------------

    /// Push `branch` once, recording it as upstream.
    pub fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.git_in(dir, &["push", "--set-upstream", remote, branch])?;
        Ok(())
    }

    /// Push with bounded retries and linear backoff.
    pub fn push_with_retry(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
        policy: &RetryPolicy,
    ) -> Result<()> {
        policy.run(
            || self.push(dir, remote, branch),
            |_, wait| {
                tracing::info!(%remote, %branch, wait_ms = wait.as_millis() as u64, "Push failed; retrying");
            },
        )
    }

    pub fn pull(&self, dir: &Path) -> Result<()> {
        self.git_in(dir, &["pull", "--quiet"])?;
        Ok(())
    }

    pub fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["push", remote, "--delete", branch])?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Worktrees
    // ------------------------------------------------------------------

    /// Attach a worktree at `dir` (relative to the root) on `branch`.
    pub fn worktree_add(&self, dir: &str, branch: &str) -> Result<()> {
        self.git(&["worktree", "add", dir, branch])?;
        Ok(())
    }

    pub fn worktree_remove(&self, dir: &str) -> Result<()> {
        self.git(&["worktree", "remove", "--force", dir])?;
        Ok(())
    }

    /// Drop administrative records of worktrees whose directory is gone.
    pub fn worktree_prune(&self) -> Result<()> {
        self.git(&["worktree", "prune"])?;
        Ok(())
    }
}
