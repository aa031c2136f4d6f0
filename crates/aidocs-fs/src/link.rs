//! Platform link backend
//!
//! Context paths in the main tree are made visible through links into the
//! doc worktree. On unix these are symlinks; on Windows directories become
//! junctions (no elevation required) and files become file symlinks. The
//! backend is chosen once, at the boundary, through [`platform_linker`].

use std::fs;
use std::path::Path;

use crate::{Error, Result, copy};

/// Creates a link at `link` pointing at `target`.
pub trait Linker {
    /// Create the link. The parent of `link` must exist and `link` itself
    /// must not.
    fn link(&self, link: &Path, target: &Path) -> Result<()>;

    /// Short name of the backend, used in logs.
    fn name(&self) -> &'static str;
}

/// Symbolic links (unix, and Windows file targets).
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkLinker;

impl Linker for SymlinkLinker {
    #[cfg(unix)]
    fn link(&self, link: &Path, target: &Path) -> Result<()> {
        std::os::unix::fs::symlink(target, link).map_err(|e| link_error(link, target, e))
    }

    #[cfg(windows)]
    fn link(&self, link: &Path, target: &Path) -> Result<()> {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(|e| link_error(link, target, e))
    }

    fn name(&self) -> &'static str {
        "symlink"
    }
}

/// Directory junctions created through `mklink /J`, with a symlink fallback
/// for file targets.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct JunctionLinker;

#[cfg(windows)]
impl Linker for JunctionLinker {
    fn link(&self, link: &Path, target: &Path) -> Result<()> {
        if !target.is_dir() {
            return SymlinkLinker.link(link, target);
        }

        let output = std::process::Command::new("cmd")
            .arg("/c")
            .arg("mklink")
            .arg("/J")
            .arg(link)
            .arg(target)
            .output()
            .map_err(|e| link_error(link, target, e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::LinkFailed {
                link: link.to_path_buf(),
                target: target.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "junction"
    }
}

/// The link backend for the current platform.
pub fn platform_linker() -> Box<dyn Linker> {
    #[cfg(windows)]
    {
        Box::new(JunctionLinker)
    }
    #[cfg(not(windows))]
    {
        Box::new(SymlinkLinker)
    }
}

/// Whether `path` itself is a link (not following it).
pub fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Remove a link without touching its target.
pub fn remove_link(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Directory symlinks and junctions on Windows
        Err(_) if path.is_dir() => fs::remove_dir(path).map_err(|e| Error::io(path, e)),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Whether `path` and `other` resolve to the same filesystem object.
///
/// Returns `false` when either side does not exist.
pub fn same_target(path: &Path, other: &Path) -> bool {
    match (dunce::canonicalize(path), dunce::canonicalize(other)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replace whatever is at `link` with a link to `target`.
///
/// Creates missing parent directories of `link`.
pub fn replace_with_link(linker: &dyn Linker, link: &Path, target: &Path) -> Result<()> {
    copy::remove_path(link)?;

    if let Some(parent) = link.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    linker.link(link, target)?;
    tracing::debug!(
        link = %link.display(),
        target = %target.display(),
        backend = linker.name(),
        "Created link"
    );
    Ok(())
}

/// Replace a link with a real copy of what it points at.
///
/// Returns `false` (and leaves the path alone) if `path` is not a link or
/// the link is dangling.
pub fn materialize(path: &Path) -> Result<bool> {
    if !is_link(path) {
        return Ok(false);
    }
    let target = match dunce::canonicalize(path) {
        Ok(target) => target,
        Err(_) => return Ok(false),
    };

    remove_link(path)?;
    copy::copy_path(&target, path)?;
    tracing::debug!(path = %path.display(), "Materialized link");
    Ok(true)
}

fn link_error(link: &Path, target: &Path, e: std::io::Error) -> Error {
    Error::LinkFailed {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        message: e.to_string(),
    }
}
