//! File metadata
//!
//! Normalized view over native stat results.

use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::DriverError;
use crate::storage::validation::RootContext;

/// Owner and group reported for every entry.
///
/// The backing filesystem's ownership is not consulted; these values only
/// satisfy listing formats that expect the fields and carry no access
/// control meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub owner: String,
    pub group: String,
}

impl Identity {
    pub fn new(owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            group: group.into(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new("root", "root")
    }
}

/// Snapshot of one filesystem entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub modified: SystemTime,
    pub owner: String,
    pub group: String,
}

impl FileMetadata {
    pub fn from_native(name: String, meta: &fs::Metadata, identity: &Identity) -> Self {
        let file_type = meta.file_type();
        Self {
            name,
            size: meta.len(),
            is_dir: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
            // Platforms without mtime report the epoch
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            owner: identity.owner.clone(),
            group: identity.group.clone(),
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// Returns metadata for `path` without following a final symlink
pub fn stat(
    root: &RootContext,
    identity: &Identity,
    path: &str,
) -> Result<FileMetadata, DriverError> {
    let real_path = root.resolve(path)?;
    let virtual_path = root.virtual_path(&real_path);

    let meta = fs::symlink_metadata(&real_path)
        .map_err(|e| DriverError::from_io("stat", virtual_path.clone(), e))?;

    debug!("Stat {} (real: {})", virtual_path, real_path.display());

    Ok(FileMetadata::from_native(entry_name(root, &real_path), &meta, identity))
}

/// Name of an entry as shown to clients; the root itself is `/`.
pub(crate) fn entry_name(root: &RootContext, real_path: &Path) -> String {
    if root.is_root(real_path) {
        return "/".to_string();
    }
    real_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
