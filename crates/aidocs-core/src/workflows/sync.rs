//! `sync`: pull, commit and push inside the worktree only

use aidocs_git::GitRunner;

use super::{Context, stage_worktree, timestamp};
use crate::Result;
use crate::options::RunOptions;
use crate::plan::{Flow, Pipeline, Step, WorkflowReport};
use crate::settings::Settings;

/// Commit message for a sync made at `timestamp`.
pub fn commit_message(timestamp: &str) -> String {
    format!("sync ai docs {timestamp}")
}

pub fn run<R: GitRunner>(
    ctx: &Context<'_, R>,
    settings: &Settings,
    options: RunOptions,
) -> Result<WorkflowReport> {
    ctx.require_repository()?;
    ctx.require_initialized(settings)?;

    let repo = ctx.repo();
    let sink = ctx.sink;
    let worktree = settings.worktree_path(ctx.root());

    let report = Pipeline::new("sync")
        .then(Step::warn("Pulling from remote", |_| {
            repo.pull(&worktree)?;
            sink.success("Successfully pulled latest changes");
            Ok(Flow::Continue)
        }))
        .then(Step::fatal("Staging changes", |report| {
            if stage_worktree(ctx, &worktree)? {
                Ok(Flow::Continue)
            } else {
                sink.info("No changes to sync");
                report.notes.push("No changes to sync".into());
                Ok(Flow::Finish)
            }
        }))
        .then(Step::fatal("Creating commit", |report| {
            let message = commit_message(&timestamp());
            repo.commit(&worktree, &message, false)?;
            sink.success(&format!("Created commit: {message}"));
            report.commit = Some(message);
            Ok(Flow::Continue)
        }))
        .then(Step::fatal("Pushing to remote", |report| {
            ctx.push_doc_branch(&worktree, settings)?;
            report.pushed = true;
            sink.success(&format!(
                "Pushed changes to {}/{}",
                settings.remote,
                settings.doc_branch()
            ));
            Ok(Flow::Continue)
        }))
        .run(sink, options.dry_run)?;

    if options.dry_run {
        sink.warn("Dry run mode - no changes were made");
    }
    Ok(report)
}
