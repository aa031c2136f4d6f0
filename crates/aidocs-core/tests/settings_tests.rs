//! Tests for settings loading and resolution

use aidocs_core::settings::{RawSettings, Settings, write_scaffold};
use aidocs_core::{Error, ErrorKind};
use aidocs_fs::{ConfigStore, NormalizedPath};
use aidocs_git::GitRepo;
use aidocs_test_utils::fake::FakeGit;
use aidocs_test_utils::git::fake_git_dir;
use proptest::prelude::*;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, GitRepo<FakeGit>) {
    let dir = TempDir::new().unwrap();
    fake_git_dir(dir.path());
    let repo = GitRepo::new(FakeGit::new(), dir.path());
    (dir, repo)
}

fn write(dir: &TempDir, name: &str, content: &str) -> NormalizedPath {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    NormalizedPath::new(path)
}

mod defaults {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let (dir, repo) = setup();
        let path = write(&dir, ".ai-docs.config.yml", "userName: alice\n");

        let settings = Settings::load(&path, &repo).unwrap();

        assert_eq!(settings.main_branch, "main");
        assert_eq!(settings.doc_branch(), "@doc/alice");
        assert_eq!(settings.worktree_dir.as_str(), ".mem");
        assert_eq!(settings.remote, "origin");
        assert_eq!(settings.push_max_attempts, 3);
        assert_eq!(settings.doc_dir.as_ref().map(|d| d.as_str()), Some("docs/ai"));
        let agents: Vec<&str> = settings.agent_paths.keys().map(String::as_str).collect();
        assert_eq!(agents, vec!["Claude", "Cline", "Cursor", "Gemini"]);
        assert_eq!(
            settings.ignore_patterns,
            vec!["/memory-bank/", "/.ai-memory/", "/.gemini/context/", "/.cursor/rules/"]
        );
    }

    #[test]
    fn test_required_ignore_lines_append_worktree() {
        let settings = Settings::resolve(RawSettings::default(), "alice").unwrap();
        let lines = settings.required_ignore_lines();
        assert_eq!(lines.last().map(String::as_str), Some(".mem"));
        assert_eq!(lines.len(), 9);
        assert!(lines.contains(&"/memory-bank".to_string()));
        assert!(lines.contains(&"/memory-bank/".to_string()));
    }

    #[test]
    fn test_required_ignore_lines_dedupe() {
        let raw = RawSettings {
            agent_context_paths: [("Cline".to_string(), "x".to_string())].into_iter().collect(),
            ignore_patterns: vec![".mem".into(), " /x/ ".into(), "/x/".into()],
            ..RawSettings::default()
        };
        let settings = Settings::resolve(raw, "alice").unwrap();
        assert_eq!(settings.required_ignore_lines(), vec![".mem", "/x/", "/x"]);
    }

    #[test]
    fn test_context_path_listed_without_slash_is_not_repeated() {
        let raw = RawSettings {
            agent_context_paths: [("Claude".to_string(), "CLAUDE.md".to_string())]
                .into_iter()
                .collect(),
            ignore_patterns: vec!["CLAUDE.md".into()],
            ..RawSettings::default()
        };
        let settings = Settings::resolve(raw, "alice").unwrap();
        assert_eq!(settings.required_ignore_lines(), vec!["CLAUDE.md", ".mem"]);
    }
}

mod user_name {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_falls_back_to_git_config() {
        let (dir, repo) = setup();
        repo.runner().set_user_name("Alice Smith");
        let path = write(&dir, "c.yml", "mainBranchName: main\n");

        let settings = Settings::load(&path, &repo).unwrap();

        assert_eq!(settings.user_name, "Alice Smith");
        assert_eq!(settings.doc_branch(), "@doc/Alice-Smith");
    }

    #[test]
    fn test_explicit_name_skips_git() {
        let (dir, repo) = setup();
        let path = write(&dir, "c.yml", "userName: bob\n");

        Settings::load(&path, &repo).unwrap();

        assert_eq!(repo.runner().count(&["config"]), 0);
    }

    #[test]
    fn test_never_empty() {
        let (dir, repo) = setup();
        let path = write(&dir, "c.yml", "userName: \"\"\n");

        let settings = Settings::load(&path, &repo).unwrap();

        assert!(!settings.user_name.is_empty());
    }
}

mod formats {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_with_aliases() {
        let (dir, repo) = setup();
        let path = write(
            &dir,
            "c.json",
            r#"{
                "userName": "carol",
                "docBranchTemplate": "notes/{userName}",
                "agentContextPaths": { "Claude": "CLAUDE.md" }
            }"#,
        );

        let settings = Settings::load(&path, &repo).unwrap();

        assert_eq!(settings.doc_branch(), "notes/carol");
        assert_eq!(settings.agent_paths.len(), 1);
        assert_eq!(settings.agent_paths["Claude"].as_str(), "CLAUDE.md");
    }

    #[test]
    fn test_toml_replaces_agent_map() {
        let (dir, repo) = setup();
        let path = write(
            &dir,
            "c.toml",
            "userName = \"dave\"\ndocWorktreeDir = \".notes\"\n\n[aIAgentMemoryContextPath]\nCline = \"memory-bank\"\n",
        );

        let settings = Settings::load(&path, &repo).unwrap();

        assert_eq!(settings.worktree_dir.as_str(), ".notes");
        assert_eq!(settings.context_paths().len(), 1);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (dir, repo) = setup();
        let path = write(&dir, "c.yaml", "userName: erin\nfutureKey: 42\n");
        assert!(Settings::load(&path, &repo).is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let (dir, repo) = setup();
        let path = write(&dir, "c.ini", "userName=x\n");

        let err = Settings::load(&path, &repo).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_malformed_yaml() {
        let (dir, repo) = setup();
        let path = write(&dir, "c.yml", "userName: [unclosed\n");

        let err = Settings::load(&path, &repo).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_file() {
        let (dir, repo) = setup();
        let path = NormalizedPath::new(dir.path().join("absent.yml"));

        let err = Settings::load(&path, &repo).unwrap_err();

        assert!(matches!(err, Error::ConfigMissing { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}

mod validation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::parent_escape(RawSettings { doc_worktree_dir: "../mem".into(), ..RawSettings::default() })]
    #[case::absolute_worktree(RawSettings { doc_worktree_dir: "/tmp/mem".into(), ..RawSettings::default() })]
    #[case::empty_worktree(RawSettings { doc_worktree_dir: "".into(), ..RawSettings::default() })]
    #[case::empty_main(RawSettings { main_branch_name: " ".into(), ..RawSettings::default() })]
    #[case::bad_template(RawSettings { doc_branch_name_template: "doc..{userName}".into(), ..RawSettings::default() })]
    #[case::doc_is_main(RawSettings { doc_branch_name_template: "main".into(), ..RawSettings::default() })]
    #[case::zero_attempts(RawSettings { push_max_attempts: 0, ..RawSettings::default() })]
    fn test_rejected(#[case] raw: RawSettings) {
        let err = Settings::resolve(raw, "alice").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config, "got: {err}");
    }

    #[test]
    fn test_agent_path_escape_rejected() {
        let mut raw = RawSettings::default();
        raw.agent_context_paths
            .insert("Evil".into(), "../../etc".into());

        let err = Settings::resolve(raw, "alice").unwrap_err();

        assert!(err.to_string().contains("aIAgentMemoryContextPath.Evil"), "got: {err}");
    }

    #[test]
    fn test_empty_doc_dir_disables() {
        let raw = RawSettings {
            doc_dir: Some(String::new()),
            ..RawSettings::default()
        };
        assert_eq!(Settings::resolve(raw, "alice").unwrap().doc_dir, None);
    }
}

mod scaffold {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_yaml_scaffold_loads() {
        let (dir, repo) = setup();
        let path = NormalizedPath::new(dir.path().join(".ai-docs.config.yml"));

        write_scaffold(&path).unwrap();
        repo.runner().set_user_name("alice");
        let settings = Settings::load(&path, &repo).unwrap();

        assert_eq!(settings.doc_branch(), "@ai-docs/alice");
        assert_eq!(settings.worktree_dir.as_str(), ".ai-docs");
        assert_eq!(settings.agent_paths["Claude"].as_str(), "CLAUDE.md");
        assert!(settings.ignore_patterns.contains(&"GEMINI.md".to_string()));
    }

    #[rstest]
    #[case("c.json")]
    #[case("c.toml")]
    fn test_structured_scaffold_matches(#[case] name: &str) {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join(name));

        write_scaffold(&path).unwrap();
        let raw: RawSettings = ConfigStore::new().load(&path).unwrap();

        assert_eq!(raw, RawSettings::scaffold());
    }
}

proptest! {
    #[test]
    fn prop_rendered_branch_is_valid(user in "[A-Za-z0-9 ._~^:-]{1,20}") {
        let settings = Settings::resolve(RawSettings::default(), user.clone());
        if let Ok(settings) = settings {
            prop_assert!(aidocs_git::naming::validate_branch_name(settings.doc_branch()).is_ok());
            prop_assert!(!settings.doc_branch().contains(' '));
        }
    }
}
