//! Doc branch lifecycle against a real git binary
//!
//! init -> push / pull / sync -> clean, with a bare repository as `origin`.

use std::time::Duration;

use aidocs_core::settings::Settings;
use aidocs_core::workflows::{clean, init, pull, push, sync};
use aidocs_core::{
    AutoConfirm, CleanOutcome, Context, Error, ErrorKind, InitOutcome, RecordingSink, RunOptions,
};
use aidocs_fs::{NormalizedPath, platform_linker};
use aidocs_git::{GitRepo, SystemGit};
use aidocs_test_utils::git::{branches_share_history, git, tip_parent_count};
use aidocs_test_utils::repo::{CONFIG_FILE, TestRepo};
use pretty_assertions::assert_eq;

const DOC_BRANCH: &str = "@doc/alice";

const CONFIG: &str = "\
userName: alice
docWorktreeDir: .mem
aIAgentMemoryContextPath:
  Cline: memory-bank
  Claude: CLAUDE.md
ignorePatterns:
  - /memory-bank/
  - CLAUDE.md
";

struct Lifecycle {
    repo: TestRepo,
    git: GitRepo<SystemGit>,
    sink: RecordingSink,
}

impl Lifecycle {
    fn new() -> Self {
        let repo = TestRepo::new();
        repo.init_git_with_origin();
        repo.write_config(CONFIG);
        repo.write_file("memory-bank/notes.md", "v1");
        repo.write_file("CLAUDE.md", "# Claude");
        let git = GitRepo::new(SystemGit::new(), repo.root());
        Self {
            repo,
            git,
            sink: RecordingSink::new(),
        }
    }

    fn config(&self) -> NormalizedPath {
        NormalizedPath::new(self.repo.path(CONFIG_FILE))
    }

    fn run_init(&self, options: RunOptions) -> InitOutcome {
        self.try_init(options).unwrap()
    }

    fn try_init(&self, options: RunOptions) -> aidocs_core::Result<InitOutcome> {
        self.with_ctx(|ctx| init::run(ctx, &self.config(), options))
    }

    fn settings(&self) -> Settings {
        Settings::load(&self.config(), &self.git).unwrap()
    }

    fn with_ctx<T>(&self, f: impl FnOnce(&Context<'_, SystemGit>) -> T) -> T {
        let linker = platform_linker();
        let ctx = Context::new(&self.git, linker.as_ref(), &self.sink)
            .with_retry_unit(Duration::ZERO);
        f(&ctx)
    }

    fn remote_has_doc_branch(&self) -> bool {
        let repo = git2::Repository::open(self.repo.root()).unwrap();
        repo.find_reference(&format!("refs/remotes/origin/{DOC_BRANCH}"))
            .is_ok()
    }
}

#[test]
fn test_init_creates_orphan_branch_and_worktree() {
    let lc = Lifecycle::new();

    let outcome = lc.run_init(RunOptions::default());

    assert!(matches!(outcome, InitOutcome::Initialized(_)));
    assert_eq!(tip_parent_count(lc.repo.root(), DOC_BRANCH), 0);
    assert!(!branches_share_history(lc.repo.root(), DOC_BRANCH, "main"));
    assert_eq!(git(lc.repo.root(), &["branch", "--show-current"]), "main");
    assert!(lc.remote_has_doc_branch());

    lc.repo.assert_is_link("memory-bank");
    lc.repo.assert_is_link("CLAUDE.md");
    assert_eq!(lc.repo.read_file("memory-bank/notes.md"), "v1");
    lc.repo.assert_line_once(".gitignore", ".mem");

    // Context files are committed as content, never as links
    let tree = git(lc.repo.root(), &["ls-tree", "-r", DOC_BRANCH]);
    assert!(tree.contains("memory-bank/notes.md"), "tree: {tree}");
    assert!(!tree.contains("120000"), "symlink committed: {tree}");

    // The main branch never sees the context files
    let main_tree = git(lc.repo.root(), &["ls-tree", "-r", "--name-only", "main"]);
    assert_eq!(main_tree, "README.md");

    // The links themselves are ignored on main
    let status = git(lc.repo.root(), &["status", "--porcelain", "--untracked-files=all"]);
    assert!(
        !status
            .lines()
            .any(|l| l.contains("memory-bank") || l.contains("CLAUDE.md") || l.contains(".mem")),
        "status: {status}"
    );
    lc.repo.assert_line_once(".gitignore", "/memory-bank");
}

#[test]
fn test_init_refuses_to_discard_uncommitted_edits() {
    let lc = Lifecycle::new();
    lc.repo.write_file("README.md", "LOCAL UNCOMMITTED EDIT");

    let err = lc.try_init(RunOptions::default()).unwrap_err();

    assert!(matches!(&err, Error::UncommittedChanges { files } if files == &["README.md"]));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(lc.repo.read_file("README.md"), "LOCAL UNCOMMITTED EDIT");
    assert_eq!(git(lc.repo.root(), &["branch", "--show-current"]), "main");
    assert_eq!(git(lc.repo.root(), &["branch", "--list", DOC_BRANCH]), "");
}

#[test]
fn test_init_refuses_context_path_tracked_on_main() {
    let lc = Lifecycle::new();
    git(lc.repo.root(), &["add", "CLAUDE.md"]);
    git(lc.repo.root(), &["commit", "--quiet", "-m", "Add CLAUDE.md"]);

    let err = lc.try_init(RunOptions::default()).unwrap_err();

    assert!(matches!(err, Error::TrackedContextPath { .. }));
    let meta = std::fs::symlink_metadata(lc.repo.path("CLAUDE.md")).unwrap();
    assert!(!meta.file_type().is_symlink());
    assert_eq!(git(lc.repo.root(), &["status", "--porcelain", "--", "CLAUDE.md"]), "");
    assert_eq!(git(lc.repo.root(), &["branch", "--list", DOC_BRANCH]), "");
}

#[test]
fn test_push_and_sync_reach_remote() {
    let lc = Lifecycle::new();
    lc.run_init(RunOptions::default());
    let settings = lc.settings();

    lc.repo.write_file("memory-bank/notes.md", "v2");
    let report = lc
        .with_ctx(|ctx| push::run(ctx, &settings, RunOptions::default()))
        .unwrap();
    assert!(report.pushed);
    assert_eq!(report.linked, 2);

    lc.repo.write_file(".mem/CLAUDE.md", "# Claude v2");
    let report = lc
        .with_ctx(|ctx| sync::run(ctx, &settings, RunOptions::default()))
        .unwrap();
    assert!(report.pushed);

    let log = git(
        lc.repo.root(),
        &["log", "--format=%s", &format!("origin/{DOC_BRANCH}")],
    );
    let subjects: Vec<&str> = log.lines().collect();
    assert_eq!(subjects.len(), 3, "log: {log}");
    assert!(subjects[0].starts_with("sync ai docs "));
    assert!(subjects[1].starts_with("Update AI docs "));
    assert_eq!(subjects[2], "Initial AI docs commit");
}

#[test]
fn test_pull_overwrite_replaces_local_copy() {
    let lc = Lifecycle::new();
    lc.run_init(RunOptions::default());
    let settings = lc.settings();

    std::fs::remove_file(lc.repo.path("CLAUDE.md")).unwrap();
    lc.repo.write_file("CLAUDE.md", "local draft");

    let kept = lc
        .with_ctx(|ctx| pull::run(ctx, &settings, RunOptions::default()))
        .unwrap();
    assert_eq!(lc.repo.read_file("CLAUDE.md"), "local draft");
    assert_eq!(kept.copied, 0);

    let replaced = lc
        .with_ctx(|ctx| pull::run(ctx, &settings, RunOptions::overwrite()))
        .unwrap();
    assert_eq!(lc.repo.read_file("CLAUDE.md"), "# Claude");
    assert_eq!(replaced.copied, 1);
    assert_eq!(replaced.linked, 1);
}

#[test]
fn test_force_reinit_keeps_edited_content() {
    let lc = Lifecycle::new();
    lc.run_init(RunOptions::default());
    lc.repo.write_file("memory-bank/notes.md", "v2");

    let outcome = lc.run_init(RunOptions::forced());

    assert!(matches!(outcome, InitOutcome::Initialized(_)));
    assert_eq!(tip_parent_count(lc.repo.root(), DOC_BRANCH), 0);
    assert_eq!(lc.repo.read_file(".mem/memory-bank/notes.md"), "v2");
    lc.repo.assert_is_link("memory-bank");
}

#[test]
fn test_clean_removes_everything() {
    let lc = Lifecycle::new();
    lc.run_init(RunOptions::default());
    let settings = lc.settings();

    let outcome = lc
        .with_ctx(|ctx| clean::run(ctx, &settings, RunOptions::default(), &AutoConfirm(true)))
        .unwrap();

    assert!(matches!(outcome, CleanOutcome::Cleaned(_)));
    lc.repo.assert_file_not_exists(".mem");
    lc.repo.assert_file_not_exists("memory-bank");
    lc.repo.assert_file_not_exists("CLAUDE.md");
    assert_eq!(git(lc.repo.root(), &["branch", "--list", DOC_BRANCH]), "");
    assert_eq!(
        git(lc.repo.root(), &["ls-remote", "--heads", "origin", DOC_BRANCH]),
        ""
    );
    let worktrees = git(lc.repo.root(), &["worktree", "list", "--porcelain"]);
    assert_eq!(
        worktrees.lines().filter(|l| l.starts_with("worktree ")).count(),
        1
    );
}
