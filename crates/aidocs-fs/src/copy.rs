//! Recursive file and directory copies

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Copy a file or directory tree from `src` to `dst`.
///
/// Directories are merged into an existing destination; files overwrite.
/// Parent directories of `dst` are created as needed. Links inside a copied
/// tree are followed.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| Error::io(src, e))?;

    if let Some(parent) = dst.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if metadata.is_dir() {
        copy_dir(src, dst)
    } else {
        fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;
        Ok(())
    }
}

/// Replace whatever is at `dst` with a copy of `src`.
///
/// Unlike [`copy_path`], files that exist only in the destination do not
/// survive.
pub fn replace_path(src: &Path, dst: &Path) -> Result<()> {
    remove_path(dst)?;
    copy_path(src, dst)
}

/// Remove a file, link or directory tree. Missing paths are not an error.
///
/// Links are removed without touching their targets.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    let result = if metadata.file_type().is_symlink() {
        crate::link::remove_link(path)
    } else if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    };

    if result.is_ok() {
        tracing::trace!(path = %path.display(), "Removed path");
    }
    result
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if fs::metadata(&from).map_err(|e| Error::io(&from, e))?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::io(&to, e))?;
        }
    }

    Ok(())
}
