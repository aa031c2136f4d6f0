//! `init`: create the doc branch, attach its worktree, link context paths
//!
//! The doc branch is an orphan: its root commit holds only the context
//! paths staged from the main tree. Afterwards the main tree is back on the
//! main branch, the worktree is attached, and each context path in the main
//! tree is a link into the worktree.

use std::path::PathBuf;

use aidocs_fs::{NormalizedPath, ignore, link};
use aidocs_git::GitRunner;

use super::{Context, INITIAL_COMMIT_MESSAGE, occupied};
use crate::options::RunOptions;
use crate::plan::{Flow, Pipeline, Step, WorkflowReport};
use crate::settings::{Settings, write_scaffold};
use crate::{Error, Result};

/// How `init` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// No config file existed; a starter one was written (unless dry run)
    /// and nothing else happened.
    Scaffolded { path: PathBuf, written: bool },
    Initialized(WorkflowReport),
}

/// Printed after a scaffold config is written.
pub const SCAFFOLD_HINT: &str =
    "Please review and edit the configuration file, then run 'ai-docs init' again.";

/// Printed after a successful initialization.
pub const NEXT_STEPS: &[&str] = &[
    "Edit AI memory files in the symlinked directories",
    "Run 'ai-docs push' to commit and push changes",
    "Run 'ai-docs pull' to get latest changes from remote",
];

/// Run `init` against the config file at `config_path`.
pub fn run<R: GitRunner>(
    ctx: &Context<'_, R>,
    config_path: &NormalizedPath,
    options: RunOptions,
) -> Result<InitOutcome> {
    ctx.require_repository()?;

    let settings = match Settings::load(config_path, ctx.repo()) {
        Ok(settings) => settings,
        Err(Error::ConfigMissing { path }) => return scaffold(ctx, config_path, path, options),
        Err(e) => return Err(e),
    };
    ctx.sink.info(&format!("Loaded config from: {config_path}"));
    ctx.sink.info(&format!("Doc branch: {}", settings.doc_branch()));
    ctx.sink.info(&format!("Worktree dir: {}", settings.worktree_dir));

    let previous = check(ctx, &settings, options)?;
    let report = pipeline(ctx, &settings, options, previous).run(ctx.sink, options.dry_run)?;

    if options.dry_run {
        ctx.sink.warn("Dry run mode - no changes were made");
    } else {
        ctx.sink.success("AI docs initialized successfully!");
    }
    Ok(InitOutcome::Initialized(report))
}

fn scaffold<R: GitRunner>(
    ctx: &Context<'_, R>,
    config_path: &NormalizedPath,
    path: PathBuf,
    options: RunOptions,
) -> Result<InitOutcome> {
    ctx.sink
        .warn(&format!("Config file not found at: {config_path}"));
    if options.dry_run {
        ctx.sink
            .info(&format!("Would create sample config file: {config_path}"));
        return Ok(InitOutcome::Scaffolded {
            path,
            written: false,
        });
    }

    write_scaffold(config_path)?;
    ctx.sink
        .success(&format!("Created sample config file: {config_path}"));
    Ok(InitOutcome::Scaffolded {
        path,
        written: true,
    })
}

/// Read-only preconditions and guards. Returns the branch checked out now.
fn check<R: GitRunner>(
    ctx: &Context<'_, R>,
    settings: &Settings,
    options: RunOptions,
) -> Result<String> {
    let repo = ctx.repo();

    if !repo.branch_exists(&settings.main_branch) {
        return Err(Error::MainBranchMissing {
            branch: settings.main_branch.clone(),
        });
    }

    if !options.force {
        if repo.branch_exists(settings.doc_branch()) {
            return Err(Error::GuardConflict {
                what: format!("Doc branch '{}'", settings.doc_branch()),
            });
        }
        if occupied(&settings.worktree_path(ctx.root())) {
            return Err(Error::GuardConflict {
                what: format!("Worktree directory '{}'", settings.worktree_dir),
            });
        }
    }

    // The orphan checkout unstages everything and the later forced switch
    // rewrites tracked files from the main branch.
    let files = repo.tracked_changes(ctx.root())?;
    if !files.is_empty() {
        return Err(Error::UncommittedChanges { files });
    }

    // A context path committed on main would end up both tracked there and
    // replaced by a link.
    for rel in settings.context_paths() {
        if repo.tracked_on(&settings.main_branch, rel.as_str())? {
            return Err(Error::TrackedContextPath {
                path: rel.as_str().to_string(),
                branch: settings.main_branch.clone(),
            });
        }
    }

    Ok(repo.current_branch()?)
}

fn pipeline<'a, R: GitRunner>(
    ctx: &'a Context<'a, R>,
    settings: &'a Settings,
    options: RunOptions,
    previous: String,
) -> Pipeline<'a> {
    let repo = ctx.repo();
    let sink = ctx.sink;
    let root = ctx.root();
    let doc_branch = settings.doc_branch();
    let worktree = settings.worktree_path(root);

    let mut pipeline = Pipeline::new("init");

    if options.force && repo.branch_exists(doc_branch) {
        let worktree = worktree.clone();
        pipeline.push(Step::fatal(
            format!("Removing existing branch: {doc_branch}"),
            move |_| {
                ctx.materialize_links(settings)?;
                if occupied(&worktree) {
                    ctx.detach_worktree(settings)?;
                } else {
                    ctx.prune_worktrees();
                }
                repo.delete_branch(doc_branch)?;
                Ok(Flow::Continue)
            },
        ));
    }

    pipeline.push(Step::fatal(
        format!("Creating docs branch: {doc_branch}"),
        move |_| {
            repo.checkout_orphan(doc_branch)?;
            let actual = repo.current_branch()?;
            if actual != doc_branch {
                return Err(Error::BranchSwitch {
                    expected: doc_branch.to_string(),
                    actual,
                });
            }
            sink.success(&format!("Switched to orphan branch: {doc_branch}"));
            Ok(Flow::Continue)
        },
    ));

    let main = settings.main_branch.as_str();
    pipeline.push(Step::fatal("Staging context paths", move |report| {
        stage_context_paths(ctx, settings, report).map_err(|e| stranded(main, e))
    }));

    pipeline.push(Step::fatal("Creating initial commit", move |report| {
        repo.commit(root, INITIAL_COMMIT_MESSAGE, true)
            .map_err(|e| stranded(main, e.into()))?;
        report.commit = Some(INITIAL_COMMIT_MESSAGE.to_string());
        Ok(Flow::Continue)
    }));

    pipeline.push(Step::warn("Pushing doc branch", move |report| {
        ctx.push_doc_branch(root, settings)?;
        report.pushed = true;
        sink.success(&format!("Pushed branch to {}", settings.remote));
        Ok(Flow::Continue)
    }));

    pipeline.push(
        Step::fatal(format!("Returning to branch: {main}"), move |_| {
            repo.switch_force(main)?;
            Ok(Flow::Continue)
        })
        .with_fallback(move |_, first| {
            repo.switch_force(&previous).map_err(|second| Error::BranchRestore {
                main: main.to_string(),
                previous: previous.clone(),
                message: format!("{first}; {second}"),
            })
        }),
    );

    pipeline.push(Step::warn("Updating .gitignore", move |_| {
        let gitignore = NormalizedPath::new(root.join(".gitignore"));
        for line in ignore::ensure_lines(&gitignore, &settings.required_ignore_lines())? {
            sink.info(&format!("Added to .gitignore: {line}"));
        }
        Ok(Flow::Continue)
    }));

    if let Some(doc_dir) = &settings.doc_dir {
        pipeline.push(Step::warn(
            format!("Creating doc directory: {doc_dir}"),
            move |_| {
                let path = root.join(doc_dir.to_native());
                if !path.exists() {
                    std::fs::create_dir_all(&path)?;
                    sink.info(&format!("Created: {doc_dir}"));
                }
                Ok(Flow::Continue)
            },
        ));
    }

    {
        let worktree = worktree.clone();
        pipeline.push(Step::fatal(
            format!("Adding worktree: {}", settings.worktree_dir),
            move |_| {
                if options.force && occupied(&worktree) {
                    sink.info("Removing existing worktree");
                    ctx.detach_worktree(settings)?;
                }
                repo.worktree_add(settings.worktree_dir.as_str(), doc_branch)?;
                sink.success(&format!("Added worktree at {}", settings.worktree_dir));
                Ok(Flow::Continue)
            },
        ));
    }

    pipeline.push(Step::fatal("Linking context paths", move |report| {
        for rel in settings.context_paths() {
            let target = worktree.join(rel.to_native());
            if !target.exists() {
                sink.info(&format!("Not linked (absent from worktree): {rel}"));
                continue;
            }
            link::replace_with_link(ctx.linker, &root.join(rel.to_native()), &target)?;
            sink.info(&format!("Linked: {rel}"));
            report.linked += 1;
        }
        Ok(Flow::Continue)
    }));

    pipeline
}

/// Stage every existing context path on the orphan branch. Links are
/// materialized first so their content is committed instead of the link.
fn stage_context_paths<R: GitRunner>(
    ctx: &Context<'_, R>,
    settings: &Settings,
    report: &mut WorkflowReport,
) -> Result<Flow> {
    let root = ctx.root();
    for rel in settings.context_paths() {
        let path = root.join(rel.to_native());
        link::materialize(&path)?;
        if !path.exists() {
            ctx.sink.info(&format!("Skipped (not found): {rel}"));
            report.skipped += 1;
            continue;
        }
        match ctx.repo().add_force(rel.as_str()) {
            Ok(()) => {
                ctx.sink.info(&format!("Staged: {rel}"));
                report.copied += 1;
            }
            Err(e) => ctx.sink.warn(&format!("Failed to stage {rel}: {e}")),
        }
    }
    Ok(Flow::Continue)
}

fn stranded(main: &str, source: Error) -> Error {
    Error::Stranded {
        main: main.to_string(),
        source: Box::new(source),
    }
}
