//! Append-only maintenance of `.gitignore`-style files
//!
//! Lines are compared after trimming surrounding whitespace. Existing content
//! is never reordered or rewritten; missing lines are appended at the end.

use crate::{NormalizedPath, Result, io};

/// Ensure every line in `required` is present in the file at `path`.
///
/// Creates the file if it does not exist. Returns the lines that were
/// appended, in order. Running this twice with the same input appends
/// nothing the second time.
pub fn ensure_lines<S: AsRef<str>>(path: &NormalizedPath, required: &[S]) -> Result<Vec<String>> {
    let existing = io::read_text_or_empty(path)?;
    let missing = missing_lines(&existing, required);

    if missing.is_empty() {
        tracing::debug!(path = %path, "Ignore file already up to date");
        return Ok(missing);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for line in &missing {
        content.push_str(line);
        content.push('\n');
    }

    io::write_text(path, &content)?;
    tracing::debug!(path = %path, added = missing.len(), "Appended ignore patterns");
    Ok(missing)
}

/// Compute which of `required` are absent from `content`.
///
/// Blank entries are ignored and duplicates within `required` are collapsed,
/// keeping first-seen order.
pub fn missing_lines<S: AsRef<str>>(content: &str, required: &[S]) -> Vec<String> {
    let mut present: Vec<&str> = content.lines().map(str::trim).collect();
    let mut missing = Vec::new();

    for line in required {
        let line = line.as_ref().trim();
        if line.is_empty() || present.contains(&line) {
            continue;
        }
        present.push(line);
        missing.push(line.to_string());
    }

    missing
}
