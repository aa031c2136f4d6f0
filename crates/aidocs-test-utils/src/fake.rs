//! In-memory git simulator.
//!
//! [`FakeGit`] implements [`GitRunner`] for exactly the commands the ai-docs
//! workflows issue. Branches, HEAD, worktrees and the remote live in memory;
//! worktree directories and the files tracked on a branch are real, so the
//! filesystem side of a workflow (links, copies, ignore files) can be
//! asserted against a temp dir.
//!
//! Every call is recorded and can be made to fail with [`FakeGit::fail_on`].

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use aidocs_git::{GitOutput, GitRunner};
use tempfile::TempDir;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub dir: PathBuf,
    pub args: Vec<String>,
}

impl Call {
    /// `git arg arg ...` without quoting, for readable assertions.
    pub fn line(&self) -> String {
        format!("git {}", self.args.join(" "))
    }
}

#[derive(Debug)]
struct Failure {
    prefix: Vec<String>,
    remaining: u32,
    stderr: String,
}

#[derive(Debug, Default)]
struct State {
    branches: BTreeSet<String>,
    current: Option<String>,
    remote_branches: BTreeSet<String>,
    /// Worktree directory -> branch checked out there
    worktrees: BTreeMap<PathBuf, String>,
    dirty: BTreeSet<PathBuf>,
    /// Paths staged in the root since the last commit
    staged: Vec<String>,
    /// Relative paths tracked on each branch (content lives in the store)
    tracked: BTreeMap<String, Vec<String>>,
    commits: Vec<(String, String)>,
    user_name: Option<String>,
    failures: Vec<Failure>,
    calls: Vec<Call>,
}

/// An in-memory git.
pub struct FakeGit {
    state: RefCell<State>,
    store: TempDir,
}

impl Default for FakeGit {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGit {
    /// A repository with a single `main` branch checked out.
    pub fn new() -> Self {
        let fake = Self {
            state: RefCell::new(State::default()),
            store: TempDir::new().expect("FakeGit: failed to create object store"),
        };
        fake.add_branch("main");
        fake.state.borrow_mut().current = Some("main".into());
        fake
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    pub fn add_branch(&self, name: &str) {
        self.state.borrow_mut().branches.insert(name.to_string());
    }

    pub fn add_remote_branch(&self, name: &str) {
        self.state.borrow_mut().remote_branches.insert(name.to_string());
    }

    /// Check out `name` (or detach HEAD with `None`).
    pub fn set_current(&self, name: Option<&str>) {
        self.state.borrow_mut().current = name.map(str::to_string);
    }

    pub fn set_user_name(&self, name: &str) {
        self.state.borrow_mut().user_name = Some(name.to_string());
    }

    /// Make `git status --porcelain` in `dir` report pending changes until
    /// the next commit there.
    pub fn set_dirty(&self, dir: &Path) {
        self.state.borrow_mut().dirty.insert(dir.to_path_buf());
    }

    /// Record `path` as committed on `branch`.
    pub fn track(&self, branch: &str, path: &str) {
        self.state
            .borrow_mut()
            .tracked
            .entry(branch.to_string())
            .or_default()
            .push(path.to_string());
    }

    /// Register `dir` as a worktree on `branch` and create it.
    pub fn add_worktree(&self, dir: &Path, branch: &str) {
        fs::create_dir_all(dir).expect("FakeGit: failed to create worktree dir");
        fs::write(dir.join(".git"), "gitdir: fake\n").expect("FakeGit: failed to write .git");
        self.state
            .borrow_mut()
            .worktrees
            .insert(dir.to_path_buf(), branch.to_string());
    }

    /// Fail the next `times` calls whose arguments start with `prefix`.
    pub fn fail_on(&self, prefix: &[&str], times: u32) {
        self.state.borrow_mut().failures.push(Failure {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            remaining: times,
            stderr: format!("fatal: injected failure for git {}", prefix.join(" ")),
        });
    }

    /// Fail every call whose arguments start with `prefix`.
    pub fn always_fail_on(&self, prefix: &[&str]) {
        self.fail_on(prefix, u32::MAX);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Every call rendered as `git ...`.
    pub fn lines(&self) -> Vec<String> {
        self.state.borrow().calls.iter().map(Call::line).collect()
    }

    /// Number of calls whose arguments start with `prefix`.
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| starts_with(&c.args, prefix))
            .count()
    }

    /// Whether any call mutated repository state.
    pub fn mutated(&self) -> bool {
        const READ_ONLY: &[&str] = &[
            "rev-parse",
            "branch --show-current",
            "status",
            "config",
            "ls-tree",
        ];
        self.lines().iter().any(|line| {
            let rest = line.trim_start_matches("git ");
            !READ_ONLY.iter().any(|ro| rest.starts_with(ro))
        })
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains(name)
    }

    pub fn has_remote_branch(&self, name: &str) -> bool {
        self.state.borrow().remote_branches.contains(name)
    }

    pub fn current(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }

    pub fn worktree_branch(&self, dir: &Path) -> Option<String> {
        self.state.borrow().worktrees.get(dir).cloned()
    }

    /// Commit messages in order, with the branch they landed on.
    pub fn commits(&self) -> Vec<(String, String)> {
        self.state.borrow().commits.clone()
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    fn injected_failure(&self, args: &[String]) -> Option<GitOutput> {
        let mut state = self.state.borrow_mut();
        let failure = state
            .failures
            .iter_mut()
            .find(|f| f.remaining > 0 && starts_with(args, &f.prefix[..]))?;
        if failure.remaining != u32::MAX {
            failure.remaining -= 1;
        }
        Some(GitOutput::failed(failure.stderr.clone()))
    }

    fn branch_store(&self, branch: &str) -> PathBuf {
        self.store.path().join(branch.replace('/', "__"))
    }

    fn simulate(&self, dir: &Path, args: &[&str]) -> GitOutput {
        match args {
            ["rev-parse", "--verify", "--quiet", reference] => {
                let name = reference.trim_start_matches("refs/heads/");
                if self.has_branch(name) {
                    GitOutput::ok("0000000000000000000000000000000000000000\n")
                } else {
                    GitOutput::failed("")
                }
            }
            ["branch", "--show-current"] => {
                GitOutput::ok(format!("{}\n", self.current().unwrap_or_default()))
            }
            ["config", "user.name"] => match &self.state.borrow().user_name {
                Some(name) => GitOutput::ok(format!("{name}\n")),
                None => GitOutput::failed(""),
            },
            ["status", "--porcelain", ..] => {
                if self.state.borrow().dirty.contains(dir) {
                    GitOutput::ok(" M notes.md\n")
                } else {
                    GitOutput::ok("")
                }
            }
            ["ls-tree", "--name-only", branch, "--", path] => {
                let state = self.state.borrow();
                let tracked = state
                    .tracked
                    .get(*branch)
                    .is_some_and(|paths| paths.iter().any(|p| p == path));
                if tracked {
                    GitOutput::ok(format!("{path}\n"))
                } else {
                    GitOutput::ok("")
                }
            }
            ["checkout", "--orphan", name] => {
                if self.has_branch(name) {
                    return GitOutput::failed(format!(
                        "fatal: a branch named '{name}' already exists"
                    ));
                }
                let mut state = self.state.borrow_mut();
                state.current = Some(name.to_string());
                state.staged.clear();
                GitOutput::ok("")
            }
            ["reset", ..] => GitOutput::ok(""),
            ["add", "--force", "--", path] => {
                if !dir.join(path).exists() {
                    return GitOutput::failed(format!(
                        "fatal: pathspec '{path}' did not match any files"
                    ));
                }
                self.state.borrow_mut().staged.push(path.to_string());
                GitOutput::ok("")
            }
            ["add", "--all"] => GitOutput::ok(""),
            ["commit", "--quiet", "-m", message, rest @ ..] => self.commit(dir, message, rest),
            ["switch", "--force", name] | ["switch", name] => self.switch(dir, name),
            ["branch", "-D", name] => self.delete_branch(name),
            ["push", "--set-upstream", _remote, branch] => {
                if !self.has_branch(branch) {
                    return GitOutput::failed(format!(
                        "error: src refspec {branch} does not match any"
                    ));
                }
                self.add_remote_branch(branch);
                GitOutput::ok("")
            }
            ["push", _remote, "--delete", branch] => {
                if self.state.borrow_mut().remote_branches.remove(*branch) {
                    GitOutput::ok("")
                } else {
                    GitOutput::failed(format!(
                        "error: unable to delete '{branch}': remote ref does not exist"
                    ))
                }
            }
            ["pull", ..] => GitOutput::ok(""),
            ["worktree", "add", path, branch] => self.worktree_add(&dir.join(path), branch),
            ["worktree", "remove", "--force", path] => self.worktree_remove(&dir.join(path)),
            ["worktree", "prune"] => {
                self.state
                    .borrow_mut()
                    .worktrees
                    .retain(|path, _| path.exists());
                GitOutput::ok("")
            }
            _ => GitOutput::ok(""),
        }
    }

    fn commit(&self, dir: &Path, message: &str, rest: &[&str]) -> GitOutput {
        let allow_empty = rest.contains(&"--allow-empty");
        let branch = {
            let state = self.state.borrow();
            match state.worktrees.get(dir) {
                Some(branch) => Some(branch.clone()),
                None => state.current.clone(),
            }
        };
        let Some(branch) = branch else {
            return GitOutput::failed("fatal: no branch checked out");
        };

        let staged = std::mem::take(&mut self.state.borrow_mut().staged);
        let was_dirty = self.state.borrow_mut().dirty.remove(dir);
        if staged.is_empty() && !was_dirty && !allow_empty {
            return GitOutput::failed("nothing to commit, working tree clean");
        }

        // Snapshot staged root paths into the branch's store
        let store = self.branch_store(&branch);
        for path in &staged {
            copy_tree(&dir.join(path), &store.join(path));
        }

        let mut state = self.state.borrow_mut();
        let tracked = state.tracked.entry(branch.clone()).or_default();
        for path in staged {
            if !tracked.contains(&path) {
                tracked.push(path);
            }
        }
        state.branches.insert(branch.clone());
        state.commits.push((branch, message.to_string()));
        GitOutput::ok("")
    }

    fn switch(&self, dir: &Path, name: &str) -> GitOutput {
        if !self.has_branch(name) {
            return GitOutput::failed(format!("fatal: invalid reference: {name}"));
        }
        let mut state = self.state.borrow_mut();
        if state.worktrees.values().any(|b| b == name) {
            return GitOutput::failed(format!(
                "fatal: '{name}' is already checked out at another worktree"
            ));
        }

        // Paths tracked only on the branch being left disappear from the tree
        if let Some(previous) = state.current.clone()
            && previous != name
            && let Some(paths) = state.tracked.get(&previous)
        {
            for path in paths {
                remove_tree(&dir.join(path));
            }
        }

        state.current = Some(name.to_string());
        GitOutput::ok("")
    }

    fn delete_branch(&self, name: &str) -> GitOutput {
        let mut state = self.state.borrow_mut();
        if !state.branches.contains(name) {
            return GitOutput::failed(format!("error: branch '{name}' not found"));
        }
        if state.current.as_deref() == Some(name) {
            return GitOutput::failed(format!(
                "error: cannot delete branch '{name}' used by the main worktree"
            ));
        }
        if let Some((path, _)) = state.worktrees.iter().find(|(_, b)| b.as_str() == name) {
            return GitOutput::failed(format!(
                "error: cannot delete branch '{name}' used by worktree at '{}'",
                path.display()
            ));
        }
        state.branches.remove(name);
        state.tracked.remove(name);
        GitOutput::ok("")
    }

    fn worktree_add(&self, path: &Path, branch: &str) -> GitOutput {
        if path.exists() {
            return GitOutput::failed(format!("fatal: '{}' already exists", path.display()));
        }
        {
            let state = self.state.borrow();
            if !state.branches.contains(branch) {
                return GitOutput::failed(format!("fatal: invalid reference: {branch}"));
            }
            if state.current.as_deref() == Some(branch)
                || state.worktrees.values().any(|b| b == branch)
            {
                return GitOutput::failed(format!("fatal: '{branch}' is already checked out"));
            }
        }

        self.add_worktree(path, branch);
        let tracked = self
            .state
            .borrow()
            .tracked
            .get(branch)
            .cloned()
            .unwrap_or_default();
        let store = self.branch_store(branch);
        for rel in tracked {
            copy_tree(&store.join(&rel), &path.join(&rel));
        }
        GitOutput::ok("")
    }

    fn worktree_remove(&self, path: &Path) -> GitOutput {
        if self.state.borrow_mut().worktrees.remove(path).is_none() {
            return GitOutput::failed(format!(
                "fatal: '{}' is not a working tree",
                path.display()
            ));
        }
        remove_tree(path);
        GitOutput::ok("")
    }
}

impl GitRunner for FakeGit {
    fn run(&self, dir: &Path, args: &[&str]) -> aidocs_git::Result<GitOutput> {
        let owned: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.state.borrow_mut().calls.push(Call {
            dir: dir.to_path_buf(),
            args: owned.clone(),
        });

        if let Some(failure) = self.injected_failure(&owned) {
            return Ok(failure);
        }
        Ok(self.simulate(dir, args))
    }
}

fn starts_with(args: &[String], prefix: &[impl AsRef<str>]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p.as_ref())
}

fn copy_tree(src: &Path, dst: &Path) {
    let Ok(metadata) = fs::metadata(src) else {
        return;
    };
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).expect("FakeGit: failed to create parent");
    }
    if metadata.is_dir() {
        fs::create_dir_all(dst).expect("FakeGit: failed to create dir");
        for entry in fs::read_dir(src).expect("FakeGit: failed to read dir").flatten() {
            copy_tree(&entry.path(), &dst.join(entry.file_name()));
        }
    } else {
        fs::copy(src, dst).expect("FakeGit: failed to copy file");
    }
}

fn remove_tree(path: &Path) {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    if metadata.is_dir() {
        let _ = fs::remove_dir_all(path);
    } else {
        let _ = fs::remove_file(path);
    }
}
