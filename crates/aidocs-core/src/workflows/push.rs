//! `push`: copy local context paths into the worktree, commit, push

use aidocs_fs::{copy, link};
use aidocs_git::GitRunner;

use super::{Context, stage_worktree, timestamp};
use crate::options::RunOptions;
use crate::plan::{Flow, Pipeline, Step, WorkflowReport};
use crate::Result;
use crate::settings::Settings;

/// Commit message for a push made at `timestamp`.
pub fn commit_message(timestamp: &str) -> String {
    format!("Update AI docs {timestamp}")
}

pub fn run<R: GitRunner>(
    ctx: &Context<'_, R>,
    settings: &Settings,
    options: RunOptions,
) -> Result<WorkflowReport> {
    ctx.require_repository()?;
    ctx.require_initialized(settings)?;
    ctx.sink.info(&format!("Doc branch: {}", settings.doc_branch()));
    ctx.sink.info(&format!("Worktree dir: {}", settings.worktree_dir));

    let repo = ctx.repo();
    let sink = ctx.sink;
    let root = ctx.root();
    let worktree = settings.worktree_path(root);

    let report = Pipeline::new("push")
        .then(Step::fatal("Copying files to worktree", |report| {
            for rel in settings.context_paths() {
                let src = root.join(rel.to_native());
                let dst = worktree.join(rel.to_native());

                if !src.exists() {
                    sink.info(&format!("Source path does not exist: {rel} (skipping)"));
                    report.skipped += 1;
                    continue;
                }
                if link::same_target(&src, &dst) {
                    sink.info(&format!("Already linked: {rel}"));
                    report.linked += 1;
                    continue;
                }
                match copy::replace_path(&src, &dst) {
                    Ok(()) => {
                        sink.success(&format!("Copied: {rel}"));
                        report.copied += 1;
                    }
                    Err(e) => {
                        sink.warn(&format!("Failed to copy {rel}: {e}"));
                        report.skipped += 1;
                    }
                }
            }
            sink.info(&format!(
                "Files copied: {}, skipped: {}, linked: {}",
                report.copied, report.skipped, report.linked
            ));
            Ok(Flow::Continue)
        }))
        .then(Step::fatal("Staging changes", |report| {
            if stage_worktree(ctx, &worktree)? {
                Ok(Flow::Continue)
            } else {
                sink.info("No changes to commit");
                report.notes.push("No changes to commit".into());
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
