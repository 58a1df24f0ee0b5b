//! Idempotent shell profile edits.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

/// Append `line` to the profile at `path` unless an identical line exists.
///
/// The file is opened once, read fully and appended through the same handle,
/// and the new content goes out in one write. Returns whether the file changed.
pub fn append_line_once(path: &Path, line: &str) -> Result<bool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut existing = String::new();
    file.read_to_string(&mut existing)
        .with_context(|| format!("reading {}", path.display()))?;

    if contains_line(&existing, line) {
        return Ok(false);
    }

    let mut chunk = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        chunk.push('\n');
    }
    chunk.push_str(line);
    chunk.push('\n');

    file.write_all(chunk.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

fn contains_line(contents: &str, line: &str) -> bool {
    contents.lines().any(|l| l == line)
}
