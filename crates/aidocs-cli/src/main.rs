//! ai-docs CLI
//!
//! Keeps AI agent memory files on a dedicated orphan branch, checked out in
//! a worktree and linked back into the working tree.

mod cli;
mod commands;
mod console;
mod error;

use std::io;

use aidocs_core::RunOptions;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::Session;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "ai-docs", &mut io::stdout());
            Ok(())
        }
        Some(cmd) => {
            let cwd = std::env::current_dir()?;
            let session = Session::open(&cwd, &cli.config, cli.verbose)?;
            execute_command(&session, cmd)
        }
        None => {
            println!("{} AI docs branch manager", "ai-docs".green().bold());
            println!();
            println!("Run {} for available commands.", "ai-docs --help".cyan());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if result.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(session: &Session, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { force, dry_run } => commands::run_init(
            session,
            RunOptions {
                force,
                dry_run,
                ..RunOptions::default()
            },
        ),
        Commands::Push { dry_run } => commands::run_push(
            session,
            RunOptions {
                dry_run,
                ..RunOptions::default()
            },
        ),
        Commands::Pull { overwrite, dry_run } => commands::run_pull(
            session,
            RunOptions {
                overwrite,
                dry_run,
                ..RunOptions::default()
            },
        ),
        Commands::Sync { dry_run } => commands::run_sync(
            session,
            RunOptions {
                dry_run,
                ..RunOptions::default()
            },
        ),
        Commands::Clean { force, dry_run } => commands::run_clean(
            session,
            RunOptions {
                force,
                dry_run,
                ..RunOptions::default()
            },
        ),
        Commands::Status => commands::run_status(session),
        // Handled before a session is opened
        Commands::Completions { .. } => Ok(()),
    }
}
