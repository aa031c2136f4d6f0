//! Terminal rendering of workflow progress and prompts

use aidocs_core::{Confirm, ProgressSink};
use colored::Colorize;

/// Prints progress to stdout; warnings go to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressSink for ConsoleSink {
    fn step(&self, index: usize, total: usize, description: &str) {
        println!(
            "{} {}",
            format!("[{index}/{total}]").cyan().bold(),
            description
        );
    }

    fn success(&self, message: &str) {
        println!("   {} {}", "OK".green().bold(), message);
    }

    fn warn(&self, message: &str) {
        eprintln!("   {} {}", "WARN".yellow().bold(), message);
    }

    fn info(&self, message: &str) {
        if self.verbose {
            println!("   {}", message.dimmed());
        }
    }
}

/// Asks on the terminal. A prompt that cannot be shown counts as "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            }
        }
    }
}
