//! Error types for aidocs-fs

use std::path::PathBuf;

/// Result type for aidocs-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aidocs-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: '{extension}' (expected yml, yaml, json or toml)")]
    UnsupportedFormat { extension: String },

    #[error("Failed to create link {link} -> {target}: {message}")]
    LinkFailed {
        link: PathBuf,
        target: PathBuf,
        message: String,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is an I/O "not found" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
