//! Git repository fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE**: directory structure only. Pair it with
/// [`crate::fake::FakeGit`], which answers git commands from memory.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Run `git <args>` in `dir`, panicking with stderr on failure.
///
/// # Panics
/// Panics if git cannot be started or exits non-zero.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialises a real git repository with an initial commit using the `git` CLI.
///
/// Realism level: **REAL WITH HISTORY**: `main` branch, one commit.
///
/// - Runs `git init`
/// - Configures `user.email`, `user.name`, and `commit.gpgsign = false`
/// - Creates `README.md` and makes an initial commit
/// - Renames the default branch to `main`
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    git(path, &["init", "--quiet"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "--quiet", "-m", "Initial commit"]);
    git(path, &["branch", "-M", "main"]);
}

/// Creates a bare repository at `remote` and registers it as `origin` of the
/// repository at `path`, pushing `main` so the remote is not empty.
///
/// Realism level: **REAL WITH REMOTE**.
///
/// # Panics
/// Panics if any git operation fails.
pub fn add_bare_origin(path: &Path, remote: &Path) {
    fs::create_dir_all(remote)
        .unwrap_or_else(|e| panic!("add_bare_origin: failed to create {}: {e}", remote.display()));
    git(remote, &["init", "--quiet", "--bare"]);

    let url = remote.to_string_lossy().to_string();
    git(path, &["remote", "add", "origin", &url]);
    git(path, &["push", "--quiet", "origin", "main"]);
}

/// Number of parents of the commit at the tip of `branch`, read with `git2`.
///
/// # Panics
/// Panics if the repository or branch cannot be opened.
pub fn tip_parent_count(path: &Path, branch: &str) -> usize {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("tip_parent_count: cannot open {}: {e}", path.display()));
    let branch = repo
        .find_branch(branch, git2::BranchType::Local)
        .unwrap_or_else(|e| panic!("tip_parent_count: branch {branch} not found: {e}"));
    let commit = branch
        .get()
        .peel_to_commit()
        .unwrap_or_else(|e| panic!("tip_parent_count: cannot resolve commit: {e}"));
    commit.parent_count()
}

/// Whether `branch` and `other` share any ancestor, read with `git2`.
///
/// # Panics
/// Panics if either branch cannot be resolved.
pub fn branches_share_history(path: &Path, branch: &str, other: &str) -> bool {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("branches_share_history: cannot open {}: {e}", path.display()));
    let oid = |name: &str| {
        repo.find_branch(name, git2::BranchType::Local)
            .and_then(|b| b.get().peel_to_commit())
            .map(|c| c.id())
            .unwrap_or_else(|e| panic!("branches_share_history: {name}: {e}"))
    };
    repo.merge_base(oid(branch), oid(other)).is_ok()
}
