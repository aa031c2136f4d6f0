//! `status`: read-only summary of the doc branch setup

use std::fmt;

use aidocs_fs::{NormalizedPath, link};
use aidocs_git::GitRunner;

use super::{Context, occupied};
use crate::Result;
use crate::settings::Settings;

/// State of one context path in the main tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// A link resolving to the worktree copy.
    Linked,
    /// A real file or directory, or a link pointing somewhere else.
    Local,
    /// A link whose target is gone.
    Dangling,
    Missing,
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PathState::Linked => "linked",
            PathState::Local => "local",
            PathState::Dangling => "dangling link",
            PathState::Missing => "missing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    pub agent: String,
    pub path: NormalizedPath,
    pub state: PathState,
    /// Whether the worktree has a copy of this path.
    pub in_worktree: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub doc_branch: String,
    pub branch_exists: bool,
    pub current_branch: Option<String>,
    pub worktree_dir: NormalizedPath,
    pub worktree_exists: bool,
    /// Uncommitted changes in the worktree.
    pub pending_changes: bool,
    pub paths: Vec<PathStatus>,
}

impl StatusReport {
    /// Whether `init` has been run and not undone.
    pub fn is_initialized(&self) -> bool {
        self.branch_exists && self.worktree_exists
    }
}

pub fn run<R: GitRunner>(ctx: &Context<'_, R>, settings: &Settings) -> Result<StatusReport> {
    ctx.require_repository()?;

    let repo = ctx.repo();
    let root = ctx.root();
    let worktree = settings.worktree_path(root);
    let worktree_exists = worktree.is_dir();

    let paths = settings
        .agent_paths
        .iter()
        .map(|(agent, rel)| {
            let local = root.join(rel.to_native());
            let copy = worktree.join(rel.to_native());
            let state = if link::is_link(&local) {
                if !local.exists() {
                    PathState::Dangling
                } else if link::same_target(&local, &copy) {
                    PathState::Linked
                } else {
                    PathState::Local
                }
            } else if occupied(&local) {
                PathState::Local
            } else {
                PathState::Missing
            };
            PathStatus {
                agent: agent.clone(),
                path: rel.clone(),
                state,
                in_worktree: copy.exists(),
            }
        })
        .collect();

    Ok(StatusReport {
        doc_branch: settings.doc_branch().to_string(),
        branch_exists: repo.branch_exists(settings.doc_branch()),
        current_branch: repo.current_branch().ok(),
        worktree_dir: settings.worktree_dir.clone(),
        worktree_exists,
        pending_changes: worktree_exists && repo.has_uncommitted_changes(&worktree),
        paths,
    })
}
