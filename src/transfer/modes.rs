//! Upload write modes
//!
//! Selects whether an upload replaces the target or extends it.

use serde::Deserialize;

/// Write mode requested for a single upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Write a fresh file, discarding any existing one (STOR)
    Replace,
    /// Add to the end of an existing file (APPE, resumed STOR)
    Append,
}

impl WriteMode {
    pub fn from_append_flag(append: bool) -> Self {
        if append {
            WriteMode::Append
        } else {
            WriteMode::Replace
        }
    }
}

/// How [`WriteMode::Replace`] disposes of an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacePolicy {
    /// Remove the old entry, then create a new file in its place
    #[default]
    RemoveThenCreate,
    /// Truncate the existing file in place, keeping its inode
    Truncate,
}
