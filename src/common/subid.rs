//! Subordinate id files (`/etc/subuid`, `/etc/subgid`).
//!
//! Each entry is `name:start:count`. Only the name field matters for the
//! presence check; the rest is shown to the operator verbatim.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// One parsed mapping line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubidEntry {
    pub owner: String,
    pub start: u64,
    pub count: u64,
}

impl SubidEntry {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut fields = line.splitn(3, ':');
        let owner = fields.next()?.to_string();
        let start = fields.next()?.trim().parse().ok()?;
        let count = fields.next()?.trim().parse().ok()?;
        Some(Self {
            owner,
            start,
            count,
        })
    }
}

/// A subordinate range to hand to a user, for uids, gids or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub first: u32,
    pub last: u32,
    pub uids: bool,
    pub gids: bool,
}

impl Allocation {
    /// `usermod` arguments performing the whole allocation in one call.
    pub fn usermod_args(&self, user: &str) -> Vec<String> {
        let range = format!("{}-{}", self.first, self.last);
        let mut args = vec!["usermod".to_string()];
        if self.uids {
            args.push("--add-subuids".to_string());
            args.push(range.clone());
        }
        if self.gids {
            args.push("--add-subgids".to_string());
            args.push(range);
        }
        args.push(user.to_string());
        args
    }
}

/// Lines of `contents` whose owner field equals `user` exactly.
pub fn lines_for<'a>(contents: &'a str, user: &str) -> Vec<&'a str> {
    contents
        .lines()
        .filter(|line| {
            let line = line.trim();
            !line.starts_with('#') && line.split(':').next() == Some(user)
        })
        .collect()
}

pub fn has_entry(contents: &str, user: &str) -> bool {
    !lines_for(contents, user).is_empty()
}

/// Read a mapping file. A missing file has no entries.
pub fn read(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}
