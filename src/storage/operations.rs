//! Storage operations
//!
//! Directory listing and the mutating operations: make, delete and rename.
//! Every mutation checks the target's type first and then issues exactly one
//! filesystem call.

use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

use crate::error::DriverError;
use crate::storage::metadata::{FileMetadata, Identity};
use crate::storage::validation::RootContext;

/// Resolve `path` and lstat it, returning the real path, virtual path and
/// native metadata.
fn lstat_target(
    root: &RootContext,
    op: &'static str,
    path: &str,
) -> Result<(PathBuf, String, fs::Metadata), DriverError> {
    let real_path = root.resolve(path)?;
    let virtual_path = root.virtual_path(&real_path);
    let meta = fs::symlink_metadata(&real_path)
        .map_err(|e| DriverError::from_io(op, virtual_path.clone(), e))?;
    Ok((real_path, virtual_path, meta))
}

/// Lists the immediate children of a directory
pub fn list_directory(
    root: &RootContext,
    identity: &Identity,
    path: &str,
) -> Result<Vec<FileMetadata>, DriverError> {
    let (real_path, virtual_path, meta) = lstat_target(root, "list", path)?;

    if !meta.is_dir() {
        return Err(DriverError::NotADirectory(virtual_path));
    }

    let entries = fs::read_dir(&real_path)
        .map_err(|e| DriverError::from_io("list", virtual_path.clone(), e))?;

    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DriverError::io("list", virtual_path.clone(), e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // DirEntry::metadata does not follow symlinks
        match entry.metadata() {
            Ok(meta) => listing.push(FileMetadata::from_native(name, &meta, identity)),
            Err(e) => {
                warn!("Skipping {} in {}: {}", name, virtual_path, e);
            }
        }
    }

    debug!(
        "Listed directory {} (real: {}) - {} entries",
        virtual_path,
        real_path.display(),
        listing.len()
    );

    Ok(listing)
}

/// Creates a single directory level
pub fn make_directory(root: &RootContext, path: &str) -> Result<(), DriverError> {
    let real_path = root.resolve(path)?;
    let virtual_path = root.virtual_path(&real_path);

    fs::create_dir(&real_path).map_err(|e| DriverError::io("mkdir", virtual_path.clone(), e))?;

    info!(
        "Created directory {} (real: {})",
        virtual_path,
        real_path.display()
    );
    Ok(())
}

/// Removes an empty directory
pub fn delete_directory(root: &RootContext, path: &str) -> Result<(), DriverError> {
    let (real_path, virtual_path, meta) = lstat_target(root, "rmdir", path)?;

    if root.is_root(&real_path) {
        return Err(DriverError::PathTraversal(virtual_path));
    }

    if !meta.is_dir() {
        return Err(DriverError::NotADirectory(virtual_path));
    }

    fs::remove_dir(&real_path).map_err(|e| DriverError::io("rmdir", virtual_path.clone(), e))?;

    info!(
        "Deleted directory {} (real: {})",
        virtual_path,
        real_path.display()
    );
    Ok(())
}

/// Deletes a file
pub fn delete_file(root: &RootContext, path: &str) -> Result<(), DriverError> {
    let (real_path, virtual_path, meta) = lstat_target(root, "delete", path)?;

    if meta.is_dir() {
        return Err(DriverError::NotAFile(virtual_path));
    }

    fs::remove_file(&real_path)
        .map_err(|e| DriverError::io("delete", virtual_path.clone(), e))?;

    info!(
        "Deleted file {} (real: {})",
        virtual_path,
        real_path.display()
    );
    Ok(())
}

/// Renames a file or directory within the root
pub fn rename(root: &RootContext, from: &str, to: &str) -> Result<(), DriverError> {
    let old_path = root.resolve(from)?;
    let new_path = root.resolve(to)?;
    let old_virtual = root.virtual_path(&old_path);
    let new_virtual = root.virtual_path(&new_path);

    if root.is_root(&old_path) {
        return Err(DriverError::PathTraversal(old_virtual));
    }
    if root.is_root(&new_path) {
        return Err(DriverError::PathTraversal(new_virtual));
    }

    fs::rename(&old_path, &new_path).map_err(|e| {
        DriverError::io("rename", format!("{} -> {}", old_virtual, new_virtual), e)
    })?;

    info!("Renamed {} to {}", old_virtual, new_virtual);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, RootContext) {
        let dir = tempfile::tempdir().unwrap();
        let root = RootContext::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn list_returns_only_immediate_children() {
        let (dir, root) = setup();
        fs::create_dir_all(dir.path().join("a/nested/deeper")).unwrap();
        fs::write(dir.path().join("a/one.txt"), b"1").unwrap();
        fs::write(dir.path().join("a/nested/two.txt"), b"22").unwrap();

        let mut names: Vec<_> = list_directory(&root, &Identity::default(), "a")
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["nested", "one.txt"]);
    }

    #[test]
    fn list_missing_directory_is_not_found() {
        let (_dir, root) = setup();
        let err = list_directory(&root, &Identity::default(), "missing").unwrap_err();
        assert!(matches!(err, DriverError::NotFound(_)));
    }

    #[test]
    fn list_of_a_file_is_wrong_type() {
        let (dir, root) = setup();
        fs::write(dir.path().join("f"), b"").unwrap();
        let err = list_directory(&root, &Identity::default(), "f").unwrap_err();
        assert!(matches!(err, DriverError::NotADirectory(_)));
    }

    #[test]
    fn make_directory_is_single_level() {
        let (dir, root) = setup();
        make_directory(&root, "top").unwrap();
        assert!(dir.path().join("top").is_dir());

        let err = make_directory(&root, "missing/child").unwrap_err();
        assert!(matches!(err, DriverError::Io { op: "mkdir", .. }));

        let err = make_directory(&root, "top").unwrap_err();
        assert!(matches!(err, DriverError::Io { .. }));
    }

    #[test]
    fn delete_directory_rejects_files_and_non_empty() {
        let (dir, root) = setup();
        fs::write(dir.path().join("f"), b"").unwrap();
        fs::create_dir_all(dir.path().join("full/inner")).unwrap();

        assert!(matches!(
            delete_directory(&root, "f").unwrap_err(),
            DriverError::NotADirectory(_)
        ));
        assert!(dir.path().join("f").exists());

        assert!(matches!(
            delete_directory(&root, "full").unwrap_err(),
            DriverError::Io { op: "rmdir", .. }
        ));
        assert!(dir.path().join("full/inner").is_dir());
    }

    #[test]
    fn delete_directory_refuses_root() {
        let (_dir, root) = setup();
        assert!(matches!(
            delete_directory(&root, "/").unwrap_err(),
            DriverError::PathTraversal(_)
        ));
    }

    #[test]
    fn delete_file_rejects_directories() {
        let (dir, root) = setup();
        fs::create_dir(dir.path().join("d")).unwrap();

        assert!(matches!(
            delete_file(&root, "d").unwrap_err(),
            DriverError::NotAFile(_)
        ));
        assert!(dir.path().join("d").is_dir());
    }

    #[test]
    fn rename_missing_source_is_filesystem_error() {
        let (_dir, root) = setup();
        let err = rename(&root, "nope", "other").unwrap_err();
        assert!(matches!(err, DriverError::Io { op: "rename", .. }));
    }
}
