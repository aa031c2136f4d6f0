//! Filesystem helpers for ai-docs
//!
//! Provides normalized paths, atomic writes, format-agnostic config loading,
//! ignore-file maintenance, recursive copies and the platform link backend.

pub mod config;
pub mod copy;
pub mod error;
pub mod ignore;
pub mod io;
pub mod link;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use link::{Linker, platform_linker};
pub use path::NormalizedPath;
