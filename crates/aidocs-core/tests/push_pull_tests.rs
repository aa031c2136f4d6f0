//! Tests for the push, pull and sync workflows against the in-memory git

mod common;

use aidocs_core::workflows::pull::OVERWRITE_HINT;
use aidocs_core::workflows::{pull, push, sync};
use aidocs_core::{Error, ErrorKind, RunOptions, StepOutcome};
use aidocs_fs::{Linker, platform_linker};
use common::{DOC_BRANCH, Fixture};

mod push_workflow {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_requires_init() {
        let fx = Fixture::new();

        let err = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap_err();

        assert!(matches!(err, Error::NotInitialized { .. }));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains("ai-docs init"));
    }

    #[test]
    fn test_requires_worktree_dir() {
        let fx = Fixture::new();
        fx.fake().add_branch(DOC_BRANCH);

        let err = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap_err();

        assert!(err.to_string().contains("Worktree directory '.mem'"), "got: {err}");
    }

    #[test]
    fn test_copies_commits_and_pushes() {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file("memory-bank/notes.md", "local edit");
        fx.repo.write_file(".mem/memory-bank/stale.md", "gone after replace");
        fx.fake().set_dirty(&fx.worktree());

        let report = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert_eq!(report.copied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(fx.repo.read_file(".mem/memory-bank/notes.md"), "local edit");
        fx.repo.assert_file_not_exists(".mem/memory-bank/stale.md");

        let message = report.commit.expect("commit message");
        assert!(message.starts_with("Update AI docs "), "got: {message}");
        assert!(report.pushed);
        assert!(fx.fake().has_remote_branch(DOC_BRANCH));
        let commit_dir = fx
            .fake()
            .calls()
            .into_iter()
            .find(|c| c.args.first().map(String::as_str) == Some("commit"))
            .map(|c| c.dir);
        assert_eq!(commit_dir, Some(fx.worktree()));
    }

    #[test]
    fn test_no_changes_is_a_noop() {
        let fx = Fixture::new();
        fx.initialized();

        let report = push::run(&fx.ctx(), &fx.bare_settings(), RunOptions::default()).unwrap();

        assert_eq!(report.copied, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.commit, None);
        assert_eq!(report.outcome("Creating commit"), Some(&StepOutcome::Skipped));
        assert_eq!(fx.fake().count(&["commit"]), 0);
        assert_eq!(fx.fake().count(&["push"]), 0);
    }

    #[test]
    fn test_linked_path_is_not_copied_onto_itself() {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file(".mem/memory-bank/notes.md", "shared");
        let linker: Box<dyn Linker> = platform_linker();
        linker
            .link(&fx.repo.path("memory-bank"), &fx.repo.path(".mem/memory-bank"))
            .unwrap();

        let report = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert_eq!(report.linked, 1);
        assert_eq!(report.copied, 0);
        assert_eq!(fx.repo.read_file(".mem/memory-bank/notes.md"), "shared");
    }

    #[test]
    fn test_push_retries_then_succeeds() {
        let fx = Fixture::new();
        fx.initialized();
        fx.fake().set_dirty(&fx.worktree());
        fx.fake().fail_on(&["push"], 2);

        let report = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert!(report.pushed);
        assert_eq!(fx.fake().count(&["push"]), 3);
        assert_eq!(fx.sink.warnings().len(), 2);
    }

    #[test]
    fn test_push_exhaustion_is_fatal() {
        let fx = Fixture::new();
        fx.initialized();
        fx.fake().set_dirty(&fx.worktree());
        fx.fake().always_fail_on(&["push"]);

        let err = push::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PushExhausted);
        assert_eq!(err.failed_step(), Some("Pushing to remote"));
        assert_eq!(fx.fake().count(&["push"]), 3);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file("memory-bank/notes.md", "local");

        let report = push::run(&fx.ctx(), &fx.settings(), RunOptions::dry_run()).unwrap();

        assert!(report.steps.iter().all(|s| s.outcome == StepOutcome::Planned));
        assert!(!fx.fake().mutated());
        fx.repo.assert_file_not_exists(".mem/memory-bank");
    }
}

mod pull_workflow {
    use super::*;
    use pretty_assertions::assert_eq;

    fn setup() -> Fixture {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file(".mem/memory-bank/notes.md", "from doc branch");
        fx.repo.write_file("memory-bank/notes.md", "local");
        fx.repo.write_file("memory-bank/scratch.md", "local only");
        fx
    }

    #[test]
    fn test_keeps_local_without_overwrite() {
        let fx = setup();

        let report = pull::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert_eq!(fx.repo.read_file("memory-bank/notes.md"), "local");
        assert_eq!(report.copied, 0);
        // memory-bank kept, CLAUDE.md absent from the worktree
        assert_eq!(report.skipped, 2);
        assert_eq!(report.notes, vec![OVERWRITE_HINT.to_string()]);
    }

    #[test]
    fn test_overwrite_replaces_local() {
        let fx = setup();

        let report = pull::run(&fx.ctx(), &fx.settings(), RunOptions::overwrite()).unwrap();

        assert_eq!(fx.repo.read_file("memory-bank/notes.md"), "from doc branch");
        fx.repo.assert_file_not_exists("memory-bank/scratch.md");
        assert_eq!(report.copied, 1);
        assert!(report.notes.is_empty());
    }

    #[test]
    fn test_copies_when_no_local_copy() {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file(".mem/CLAUDE.md", "# Claude");

        let report = pull::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert_eq!(fx.repo.read_file("CLAUDE.md"), "# Claude");
        assert_eq!(report.copied, 1);
    }

    #[test]
    fn test_pull_failure_is_a_warning() {
        let fx = setup();
        fx.fake().always_fail_on(&["pull"]);

        let report = pull::run(&fx.ctx(), &fx.settings(), RunOptions::overwrite()).unwrap();

        assert!(matches!(
            report.outcome("Pulling from remote"),
            Some(StepOutcome::Warned(_))
        ));
        assert_eq!(report.copied, 1);
    }

    #[test]
    fn test_push_then_pull_without_context_paths() {
        let fx = Fixture::new();
        fx.initialized();
        let settings = fx.bare_settings();

        let pushed = push::run(&fx.ctx(), &settings, RunOptions::default()).unwrap();
        let pulled = pull::run(&fx.ctx(), &settings, RunOptions::overwrite()).unwrap();

        assert_eq!((pushed.copied, pushed.skipped), (0, 0));
        assert_eq!((pulled.copied, pulled.skipped), (0, 0));
        assert_eq!(pushed.commit, None);
        assert!(fx.fake().commits().is_empty());
    }
}

mod sync_workflow {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_worktree_is_a_noop() {
        let fx = Fixture::new();
        fx.initialized();

        let report = sync::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        assert_eq!(report.commit, None);
        assert!(!report.pushed);
        assert_eq!(fx.fake().count(&["pull"]), 1);
    }

    #[test]
    fn test_dirty_worktree_commits_and_pushes() {
        let fx = Fixture::new();
        fx.initialized();
        fx.fake().set_dirty(&fx.worktree());

        let report = sync::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        let message = report.commit.expect("commit message");
        assert!(message.starts_with("sync ai docs "), "got: {message}");
        assert!(report.pushed);
        assert_eq!(
            fx.fake().commits(),
            vec![(DOC_BRANCH.to_string(), message)]
        );
    }

    #[test]
    fn test_never_touches_main_tree() {
        let fx = Fixture::new();
        fx.initialized();
        fx.repo.write_file("memory-bank/notes.md", "local");
        fx.fake().set_dirty(&fx.worktree());

        sync::run(&fx.ctx(), &fx.settings(), RunOptions::default()).unwrap();

        fx.repo.assert_file_not_exists(".mem/memory-bank");
        assert!(fx.fake().calls().iter().all(|c| c.dir == fx.worktree()
            || c.args.first().map(String::as_str) == Some("rev-parse")));
    }
}
