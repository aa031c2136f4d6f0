//! Command implementations for aidocs-cli

mod report;
mod status;

use std::path::{Path, PathBuf};

use aidocs_core::workflows::init::{NEXT_STEPS, SCAFFOLD_HINT};
use aidocs_core::workflows::{clean, init, pull, push, sync};
use aidocs_core::{CleanOutcome, Context, InitOutcome, RunOptions, Settings};
use aidocs_fs::{Linker, NormalizedPath, platform_linker};
use aidocs_git::{GitRepo, SystemGit};
use colored::Colorize;

use crate::console::{ConsoleSink, TerminalConfirm};
use crate::error::Result;

/// Everything a command needs: repository, config location and output.
pub struct Session {
    repo: GitRepo<SystemGit>,
    linker: Box<dyn Linker>,
    sink: ConsoleSink,
    config: NormalizedPath,
}

impl Session {
    /// Open a session rooted at `cwd`; a relative `config` is resolved against it.
    pub fn open(cwd: &Path, config: &Path, verbose: bool) -> Result<Self> {
        let root = dunce::canonicalize(cwd)?;
        let config: PathBuf = if config.is_absolute() {
            config.to_path_buf()
        } else {
            root.join(config)
        };
        tracing::debug!(root = %root.display(), config = %config.display(), "Opening session");
        Ok(Self {
            repo: GitRepo::new(SystemGit::new(), root),
            linker: platform_linker(),
            sink: ConsoleSink::new(verbose),
            config: NormalizedPath::new(config),
        })
    }

    fn ctx(&self) -> Context<'_, SystemGit> {
        Context::new(&self.repo, self.linker.as_ref(), &self.sink)
    }

    /// Load settings, reporting a missing repository before a missing config.
    fn settings(&self) -> Result<Settings> {
        if !self.repo.is_repository() {
            return Err(aidocs_core::Error::NotARepository {
                path: self.repo.root().to_path_buf(),
            }
            .into());
        }
        Ok(Settings::load(&self.config, &self.repo)?)
    }
}

pub fn run_init(session: &Session, options: RunOptions) -> Result<()> {
    match init::run(&session.ctx(), &session.config, options)? {
        InitOutcome::Scaffolded { written, .. } => {
            if written {
                println!();
                println!("{}", SCAFFOLD_HINT);
            }
        }
        InitOutcome::Initialized(report) => {
            report::print(&report);
            if !report.dry_run {
                println!();
                println!("{}", "Next steps:".bold());
                for (i, line) in NEXT_STEPS.iter().enumerate() {
                    println!("  {}. {}", i + 1, line);
                }
            }
        }
    }
    Ok(())
}

pub fn run_push(session: &Session, options: RunOptions) -> Result<()> {
    let settings = session.settings()?;
    let report = push::run(&session.ctx(), &settings, options)?;
    report::print(&report);
    Ok(())
}

pub fn run_pull(session: &Session, options: RunOptions) -> Result<()> {
    let settings = session.settings()?;
    let report = pull::run(&session.ctx(), &settings, options)?;
    report::print(&report);
    Ok(())
}

pub fn run_sync(session: &Session, options: RunOptions) -> Result<()> {
    let settings = session.settings()?;
    let report = sync::run(&session.ctx(), &settings, options)?;
    report::print(&report);
    Ok(())
}

pub fn run_clean(session: &Session, options: RunOptions) -> Result<()> {
    let settings = session.settings()?;
    match clean::run(&session.ctx(), &settings, options, &TerminalConfirm)? {
        CleanOutcome::Cancelled => println!("Clean cancelled"),
        CleanOutcome::Cleaned(report) => report::print(&report),
    }
    Ok(())
}

pub fn run_status(session: &Session) -> Result<()> {
    let settings = session.settings()?;
    let report = aidocs_core::workflows::status::run(&session.ctx(), &settings)?;
    status::print(&report);
    Ok(())
}
