//! Shared fixture for workflow tests

#![allow(dead_code)]

use std::time::Duration;

use aidocs_core::settings::{RawSettings, Settings};
use aidocs_core::{Context, RecordingSink};
use aidocs_fs::{Linker, NormalizedPath, platform_linker};
use aidocs_git::GitRepo;
use aidocs_test_utils::fake::FakeGit;
use aidocs_test_utils::repo::{CONFIG_FILE, TestRepo};

pub const DOC_BRANCH: &str = "@doc/alice";

pub const CONFIG: &str = "\
userName: alice
aIAgentMemoryContextPath:
  Cline: memory-bank
  Claude: CLAUDE.md
ignorePatterns:
  - /memory-bank/
  - CLAUDE.md
";

/// A fake repository on `main` with a recording sink.
pub struct Fixture {
    pub repo: TestRepo,
    pub git: GitRepo<FakeGit>,
    pub sink: RecordingSink,
    linker: Box<dyn Linker>,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = TestRepo::new();
        repo.init_fake_git();
        let git = GitRepo::new(FakeGit::new(), repo.root());
        Self {
            repo,
            git,
            sink: RecordingSink::new(),
            linker: platform_linker(),
        }
    }

    /// A directory that is not a repository.
    pub fn without_git() -> Self {
        let repo = TestRepo::new();
        let git = GitRepo::new(FakeGit::new(), repo.root());
        Self {
            repo,
            git,
            sink: RecordingSink::new(),
            linker: platform_linker(),
        }
    }

    pub fn fake(&self) -> &FakeGit {
        self.git.runner()
    }

    pub fn ctx(&self) -> Context<'_, FakeGit> {
        Context::new(&self.git, self.linker.as_ref(), &self.sink).with_retry_unit(Duration::ZERO)
    }

    pub fn config_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.repo.path(CONFIG_FILE))
    }

    pub fn write_config(&self) {
        self.repo.write_config(CONFIG);
    }

    /// Settings matching [`CONFIG`].
    pub fn settings(&self) -> Settings {
        let raw = RawSettings {
            user_name: "alice".into(),
            agent_context_paths: [("Cline", "memory-bank"), ("Claude", "CLAUDE.md")]
                .into_iter()
                .map(|(a, p)| (a.to_string(), p.to_string()))
                .collect(),
            ignore_patterns: vec!["/memory-bank/".into(), "CLAUDE.md".into()],
            ..RawSettings::default()
        };
        Settings::resolve(raw, "alice").unwrap()
    }

    /// Settings with no context paths at all.
    pub fn bare_settings(&self) -> Settings {
        let raw = RawSettings {
            agent_context_paths: Default::default(),
            ..RawSettings::default()
        };
        Settings::resolve(raw, "alice").unwrap()
    }

    /// Pretend `init` already ran: doc branch plus attached worktree.
    pub fn initialized(&self) {
        self.fake().add_branch(DOC_BRANCH);
        self.fake().add_worktree(&self.repo.path(".mem"), DOC_BRANCH);
    }

    pub fn worktree(&self) -> std::path::PathBuf {
        self.repo.path(".mem")
    }
}
