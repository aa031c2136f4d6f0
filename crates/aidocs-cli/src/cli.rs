//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// ai-docs - Keep AI agent memory files on a dedicated git branch
#[derive(Parser, Debug)]
#[command(name = "ai-docs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (YAML, JSON or TOML)
    #[arg(
        short,
        long,
        global = true,
        env = "AI_DOCS_CONFIG",
        default_value = aidocs_core::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the doc branch and worktree, and link context paths
    ///
    /// Writes a sample configuration file and stops if none exists yet.
    ///
    /// Examples:
    ///   ai-docs init              # First-time setup
    ///   ai-docs init --force      # Recreate the doc branch and worktree
    ///   ai-docs init --dry-run    # Show the steps without running them
    Init {
        /// Replace an existing doc branch and worktree
        #[arg(short, long)]
        force: bool,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy local context paths into the worktree, commit and push
    Push {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Pull the doc branch and copy its files into the working tree
    Pull {
        /// Replace local files that already exist
        #[arg(long)]
        overwrite: bool,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Pull, commit and push inside the worktree
    Sync {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove links, the worktree and the doc branch
    Clean {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the doc branch, worktree and context path state
    Status,

    /// Generate shell completions
    ///
    /// Examples:
    ///   ai-docs completions bash > ~/.local/share/bash-completion/completions/ai-docs
    ///   ai-docs completions zsh > ~/.zfunc/_ai-docs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
