//! `pull`: update the worktree from the remote, then refresh local copies

use aidocs_fs::{copy, link};
use aidocs_git::GitRunner;

use super::{Context, occupied};
use crate::Result;
use crate::options::RunOptions;
use crate::plan::{Flow, Pipeline, Step, WorkflowReport};
use crate::settings::Settings;

/// Shown when local copies were kept because `--overwrite` was not given.
pub const OVERWRITE_HINT: &str = "Use --overwrite flag to replace existing local files";

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

    let mut report = Pipeline::new("pull")
        .then(Step::warn("Pulling from remote", |_| {
            sink.info(&format!(
                "Pulling latest changes from {}/{}",
                settings.remote,
                settings.doc_branch()
            ));
            repo.pull(&worktree)?;
            sink.success("Successfully pulled latest changes");
            Ok(Flow::Continue)
        }))
        .then(Step::fatal("Copying files to local", |report| {
            let mut kept = 0;
            for rel in settings.context_paths() {
                let src = worktree.join(rel.to_native());
                let dst = root.join(rel.to_native());

                if !src.exists() {
                    sink.info(&format!("Remote file does not exist: {rel} (skipping)"));
                    report.skipped += 1;
                    continue;
                }
                if link::same_target(&dst, &src) {
                    sink.info(&format!("Already linked: {rel}"));
                    report.linked += 1;
                    continue;
                }
                if occupied(&dst) && !options.overwrite {
                    sink.warn(&format!(
                        "Local file exists: {rel} (use --overwrite to replace)"
                    ));
                    report.skipped += 1;
                    kept += 1;
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
            if kept > 0 {
                report.notes.push(OVERWRITE_HINT.to_string());
            }
            Ok(Flow::Continue)
        }))
        .run(sink, options.dry_run)?;

    if options.dry_run {
        sink.warn("Dry run mode - no changes were made");
        report.notes.clear();
    }
    Ok(report)
}
