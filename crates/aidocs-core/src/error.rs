//! Error types for aidocs-core

use std::path::PathBuf;

/// Result type for aidocs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aidocs-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The working directory is not inside a git repository
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Main branch '{branch}' does not exist")]
    MainBranchMissing { branch: String },

    /// Doc branch or worktree missing; `init` has not been run
    #[error("{what} not found; run 'ai-docs init' first")]
    NotInitialized { what: String },

    /// Tracked files in the main tree have changes a forced branch switch
    /// would discard
    #[error("Uncommitted changes to tracked files: {}; commit or stash them first", .files.join(", "))]
    UncommittedChanges { files: Vec<String> },

    /// A context path is committed on the main branch, so it cannot be
    /// replaced by a link
    #[error("Context path '{path}' is tracked on '{branch}'; remove it with 'git rm --cached' and commit first")]
    TrackedContextPath { path: String, branch: String },

    /// A target already exists and `--force` was not given
    #[error("{what} already exists (use --force to override)")]
    GuardConflict { what: String },

    /// HEAD is not on the branch that was just checked out
    #[error("Not on expected branch '{expected}' (got '{actual}')")]
    BranchSwitch { expected: String, actual: String },

    /// Neither the main branch nor the previous branch could be restored
    #[error("Failed to return to '{main}' or '{previous}': {message}")]
    BranchRestore {
        main: String,
        previous: String,
        message: String,
    },

    #[error("Configuration not found at {path}")]
    ConfigMissing { path: PathBuf },

    /// Settings were loaded but are not usable
    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSettings { key: String, reason: String },

    /// A fatal step failed after the main tree left the main branch
    #[error(
        "{source}; the main tree is left on the unborn doc branch with an empty index, \
         run 'git switch -f {main}' to return"
    )]
    Stranded {
        main: String,
        #[source]
        source: Box<Error>,
    },

    /// A fatal workflow step failed
    #[error("{step}: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from aidocs-fs
    #[error(transparent)]
    Fs(#[from] aidocs_fs::Error),

    /// Git error from aidocs-git
    #[error(transparent)]
    Git(#[from] aidocs_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse failure category, stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    GuardConflict,
    CommandFailure,
    PushExhausted,
    BranchSwitch,
    BranchRestore,
    Config,
    Query,
    Io,
}

impl Error {
    /// The category of this error, looking through [`Error::StepFailed`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotARepository { .. }
            | Error::MainBranchMissing { .. }
            | Error::NotInitialized { .. }
            | Error::UncommittedChanges { .. }
            | Error::TrackedContextPath { .. } => ErrorKind::Precondition,
            Error::GuardConflict { .. } => ErrorKind::GuardConflict,
            Error::BranchSwitch { .. } => ErrorKind::BranchSwitch,
            Error::BranchRestore { .. } => ErrorKind::BranchRestore,
            Error::ConfigMissing { .. } | Error::InvalidSettings { .. } => ErrorKind::Config,
            Error::StepFailed { source, .. } | Error::Stranded { source, .. } => source.kind(),
            Error::Git(e) => match e {
                aidocs_git::Error::Spawn { .. } | aidocs_git::Error::CommandFailed { .. } => {
                    ErrorKind::CommandFailure
                }
                aidocs_git::Error::PushExhausted { .. } => ErrorKind::PushExhausted,
                aidocs_git::Error::Query { .. } => ErrorKind::Query,
                aidocs_git::Error::InvalidBranchName { .. } => ErrorKind::Config,
            },
            Error::Fs(e) => match e {
                aidocs_fs::Error::ConfigParse { .. }
                | aidocs_fs::Error::ConfigSerialize { .. }
                | aidocs_fs::Error::UnsupportedFormat { .. } => ErrorKind::Config,
                _ => ErrorKind::Io,
            },
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Name of the step that failed, if this error came out of a pipeline.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Error::StepFailed { step, .. } => Some(step),
            _ => None,
        }
    }
}
