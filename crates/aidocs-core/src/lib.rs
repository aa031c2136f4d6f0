//! Doc branch lifecycle orchestration for ai-docs
//!
//! This crate drives the workflows that keep AI-agent context files on a
//! dedicated orphan branch checked out in a secondary worktree:
//!
//! - **init**: create the orphan doc branch, attach the worktree, link context paths
//! - **push**: copy local context paths into the worktree, commit and push
//! - **pull**: update the worktree and refresh local copies
//! - **sync**: pull, commit and push inside the worktree
//! - **clean**: remove links, worktree and doc branch
//! - **status**: read-only summary
//!
//! # Architecture
//!
//! `aidocs-core` sits above the Layer 0 crates and below the CLI:
//!
//! ```text
//!          aidocs-cli
//!              |
//!         aidocs-core
//!              |
//!      +-------+-------+
//!      |               |
//!  aidocs-fs      aidocs-git
//! ```
//!
//! Every workflow takes a [`Context`] (repository, link backend, progress
//! sink), the resolved [`Settings`] and explicit [`RunOptions`].

pub mod confirm;
pub mod error;
pub mod options;
pub mod plan;
pub mod progress;
pub mod settings;
pub mod workflows;

pub use confirm::{AutoConfirm, Confirm};
pub use error::{Error, ErrorKind, Result};
pub use options::RunOptions;
pub use plan::{Flow, OnFailure, Pipeline, Step, StepOutcome, WorkflowReport};
pub use progress::{NullSink, ProgressSink, RecordingSink};
pub use settings::{DEFAULT_CONFIG_FILE, RawSettings, Settings};
pub use workflows::Context;
pub use workflows::clean::CleanOutcome;
pub use workflows::init::InitOutcome;
pub use workflows::status::{PathState, StatusReport};
