//! Git subprocess execution
//!
//! [`GitRunner`] is the single seam between ai-docs and the `git` binary.
//! Production code uses [`SystemGit`]; tests substitute an in-memory fake.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// A successful invocation with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with exit code 1 and the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`Error::CommandFailed`].
    pub fn into_result(self, args: &[&str]) -> Result<GitOutput> {
        if self.success() {
            Ok(self)
        } else {
            let stderr = if self.stderr.trim().is_empty() {
                self.stdout.trim().to_string()
            } else {
                self.stderr.trim().to_string()
            };
            Err(Error::CommandFailed {
                command: display_command(args),
                code: self.code,
                stderr,
            })
        }
    }
}

/// Runs git with arguments in a working directory.
///
/// Implementations report a non-zero exit through [`GitOutput`]; `Err` is
/// reserved for failing to run the process at all.
pub trait GitRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput>;
}

impl<R: GitRunner + ?Sized> GitRunner for &R {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        (**self).run(dir, args)
    }
}

impl<R: GitRunner + ?Sized> GitRunner for Box<R> {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        (**self).run(dir, args)
    }
}

/// Runs the `git` binary found on `PATH` (or at an explicit location).
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        tracing::debug!(dir = %dir.display(), command = %display_command(args), "Running git");

        let output = Command::new(&self.program)
            .current_dir(dir)
            .args(args)
            // Never block on an interactive credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| Error::Spawn {
                command: display_command(args),
                dir: dir.to_path_buf(),
                source,
            })?;

        let result = GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success() {
            tracing::debug!(
                command = %display_command(args),
                code = ?result.code,
                stderr = %result.stderr.trim(),
                "git exited non-zero"
            );
        }

        Ok(result)
    }
}

/// Render `git <args>` for logs and error messages.
pub fn display_command(args: &[&str]) -> String {
    let mut rendered = String::from("git");
    for arg in args {
        rendered.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            rendered.push('"');
            rendered.push_str(arg);
            rendered.push('"');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}
