//! Shared test utilities for the ai-docs workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`git`]: repository fixtures at three realism levels
//! - [`fake`]: [`fake::FakeGit`], an in-memory git simulator for workflow tests
//! - [`repo`]: [`repo::TestRepo`] builder for end-to-end scenarios

pub mod fake;
pub mod git;
pub mod repo;
