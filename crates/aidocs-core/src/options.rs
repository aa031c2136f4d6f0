//! Per-invocation run options

/// Flags that change how a workflow runs.
///
/// Passed explicitly into every workflow call; nothing here is global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip existence guards and confirmation prompts, replacing stale state.
    pub force: bool,
    /// Run read-only checks, then report the planned steps without executing them.
    pub dry_run: bool,
    /// Let `pull` replace existing local copies.
    pub overwrite: bool,
}

impl RunOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn overwrite() -> Self {
        Self {
            overwrite: true,
            ..Self::default()
        }
    }
}
