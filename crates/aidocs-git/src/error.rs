//! Error types for aidocs-git

use std::path::PathBuf;

/// Result type for aidocs-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aidocs-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The git binary could not be started
    #[error("Failed to run `{command}` in {dir}: {source}")]
    Spawn {
        command: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Git ran and exited non-zero
    #[error("`{command}` failed ({}): {stderr}", describe_exit(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A repository fact could not be determined
    #[error("Repository query failed: {message}")]
    Query { message: String },

    /// Every push attempt failed
    #[error("Push failed after {attempts} attempt(s): {source}")]
    PushExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
