//! [`TestRepo`] builder for ai-docs test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::git;

/// Name of the config file written by [`TestRepo::write_config`].
pub const CONFIG_FILE: &str = ".ai-docs.config.yml";

/// A temporary repository directory with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use aidocs_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.init_git();
/// repo.write_config("userName: alice\n");
/// repo.write_file("memory-bank/notes.md", "hello");
/// repo.assert_file_exists("memory-bank/notes.md");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
    remote_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            remote_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Make the directory look like a repository to `.git` marker checks.
    ///
    /// Realism level: FAKE. Pair with [`crate::fake::FakeGit`].
    pub fn init_fake_git(&self) {
        git::fake_git_dir(self.root());
    }

    /// Initialise a real repository with one commit on `main`.
    pub fn init_git(&self) {
        git::real_git_repo_with_commit(self.root());
    }

    /// [`Self::init_git`] plus a bare `origin` remote in a sibling temp dir.
    pub fn init_git_with_origin(&self) {
        self.init_git();
        git::add_bare_origin(self.root(), &self.remote_dir.path().join("origin.git"));
    }

    /// Write `.ai-docs.config.yml` with the given YAML body.
    pub fn write_config(&self, yaml: &str) {
        self.write_file(CONFIG_FILE, yaml);
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) {
        let full_path = self.path(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    pub fn read_file(&self, rel: &str) -> String {
        let full_path = self.path(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the repo root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            fs::symlink_metadata(&full_path).is_err(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` is a symlink (or junction).
    pub fn assert_is_link(&self, path: &str) {
        let full_path = self.path(path);
        let meta = fs::symlink_metadata(&full_path)
            .unwrap_or_else(|_| panic!("Expected link to exist: {}", full_path.display()));
        assert!(
            meta.file_type().is_symlink(),
            "Expected a link at {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }

    /// Assert that `line` appears exactly once (trimmed) in the file.
    pub fn assert_line_once(&self, path: &str, line: &str) {
        let count = self
            .read_file(path)
            .lines()
            .filter(|l| l.trim() == line)
            .count();
        assert_eq!(count, 1, "Expected {line:?} exactly once in {path}");
    }
}
