//! Git plumbing for ai-docs
//!
//! The `git` binary is driven as a subprocess through the [`GitRunner`]
//! trait so the workflows above this crate can be exercised against a fake.

pub mod error;
pub mod naming;
pub mod repo;
pub mod retry;
pub mod runner;

pub use error::{Error, Result};
pub use repo::GitRepo;
pub use retry::RetryPolicy;
pub use runner::{GitOutput, GitRunner, SystemGit};
