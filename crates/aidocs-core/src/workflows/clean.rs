//! `clean`: remove links, the worktree and the doc branch

use aidocs_fs::{copy, link};
use aidocs_git::GitRunner;

use super::{Context, occupied};
use crate::confirm::Confirm;
use crate::options::RunOptions;
use crate::plan::{Flow, Pipeline, Step, WorkflowReport};
use crate::settings::Settings;
use crate::Result;

/// How `clean` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// The user declined; nothing was touched.
    Cancelled,
    Cleaned(WorkflowReport),
}

/// The confirmation question for `settings`.
pub fn prompt(settings: &Settings) -> String {
    format!(
        "This will remove the worktree at '{}' and the branch '{}'. Are you sure?",
        settings.worktree_dir,
        settings.doc_branch()
    )
}

pub fn run<R: GitRunner>(
    ctx: &Context<'_, R>,
    settings: &Settings,
    options: RunOptions,
    confirm: &dyn Confirm,
) -> Result<CleanOutcome> {
    ctx.require_repository()?;

    if !options.force && !confirm.confirm(&prompt(settings)) {
        tracing::info!("Clean cancelled by user");
        return Ok(CleanOutcome::Cancelled);
    }

    let repo = ctx.repo();
    let sink = ctx.sink;
    let root = ctx.root();
    let worktree = settings.worktree_path(root);
    let doc_branch = settings.doc_branch();

    let mut report = Pipeline::new("clean")
        .then(Step::warn("Removing symlinks", |_| {
            let mut first_failure = None;
            for rel in settings.context_paths() {
                let path = root.join(rel.to_native());
                if !link::is_link(&path) {
                    continue;
                }
                sink.info(&format!("Removing symlink: {rel}"));
                if let Err(e) = link::remove_link(&path) {
                    tracing::debug!(path = %rel, error = %e, "Failed to remove symlink");
                    first_failure.get_or_insert(e);
                }
            }
            match first_failure {
                Some(e) => Err(e.into()),
                None => Ok(Flow::Continue),
            }
        }))
        .then(
            Step::fatal(
                format!("Removing worktree: {}", settings.worktree_dir),
                |_| {
                    if !occupied(&worktree) {
                        sink.info("Worktree directory does not exist");
                        return Ok(Flow::Continue);
                    }
                    repo.worktree_remove(settings.worktree_dir.as_str())?;
                    sink.success("Removed worktree");
                    Ok(Flow::Continue)
                },
            )
            .with_fallback(|_, _| {
                sink.info("Attempting manual removal");
                copy::remove_path(&worktree)?;
                sink.success("Removed worktree directory");
                Ok(())
            }),
        )
        .then(Step::warn("Pruning worktree records", |_| {
            repo.worktree_prune()?;
            Ok(Flow::Continue)
        }))
        .then(Step::fatal(format!("Deleting branch: {doc_branch}"), |_| {
            if !repo.branch_exists(doc_branch) {
                sink.info("Branch does not exist");
                return Ok(Flow::Finish);
            }
            if repo.current_branch().ok().as_deref() == Some(doc_branch) {
                sink.info("Switching away from doc branch");
                repo.switch(&settings.main_branch)?;
            }
            repo.delete_branch(doc_branch)?;
            sink.success("Deleted branch");
            Ok(Flow::Continue)
        }))
        .then(Step::warn("Deleting remote branch", |_| {
            repo.delete_remote_branch(&settings.remote, doc_branch)?;
            sink.success("Deleted remote branch");
            Ok(Flow::Continue)
        }))
        .run(sink, options.dry_run)?;

    if options.dry_run {
        sink.warn("Dry run mode - showing what would be done");
        report
            .notes
            .push(format!("Would remove worktree: {}", settings.worktree_dir));
        report.notes.push(format!("Would delete branch: {doc_branch}"));
    } else {
        sink.success("Clean completed successfully!");
    }
    Ok(CleanOutcome::Cleaned(report))
}
