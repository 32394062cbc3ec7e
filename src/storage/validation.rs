//! Path validation
//!
//! Resolves caller-supplied paths against the driver root and rejects any
//! that would land outside it.

use log::{debug, warn};
use std::path::{Component, Path, PathBuf};

use crate::error::DriverError;

/// The directory a driver is confined to.
///
/// Holds the canonical form of the configured root, so prefix checks on
/// resolved paths compare like with like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootContext {
    root: PathBuf,
}

impl RootContext {
    /// Canonicalize `root` and check that it is an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, DriverError> {
        let display = root.as_ref().to_string_lossy().into_owned();
        let root = root
            .as_ref()
            .canonicalize()
            .map_err(|e| DriverError::io("open root", display.clone(), e))?;

        if !root.is_dir() {
            return Err(DriverError::InvalidRoot(display));
        }

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Join `path` onto the root, refusing anything that escapes it.
    ///
    /// A leading `/` names the root itself. The final component is never
    /// followed, so callers can inspect or remove a symlink without touching
    /// its target.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, DriverError> {
        let relative = normalize(path).ok_or_else(|| {
            warn!("Rejected path escaping root: {}", path);
            DriverError::PathTraversal(path.to_string())
        })?;
        let resolved = self.root.join(&relative);

        if let Some(parent) = resolved.parent() {
            if resolved != self.root && !self.contains_existing(parent) {
                warn!(
                    "Rejected path {} resolving outside root through a link",
                    path
                );
                return Err(DriverError::PathTraversal(path.to_string()));
            }
        }

        debug!("Resolved {} -> {}", path, resolved.display());
        Ok(resolved)
    }

    /// Check that a resolved path still lies under the root once every link
    /// in it, the final one included, is followed.
    ///
    /// Used before opening a path for reading or writing through it. A path
    /// that cannot be canonicalized (missing or dangling) is left for the
    /// open call to report.
    pub fn ensure_followed_within(&self, real: &Path) -> Result<(), DriverError> {
        match real.canonicalize() {
            Ok(canonical) if !canonical.starts_with(&self.root) => {
                let virtual_path = self.virtual_path(real);
                warn!(
                    "Rejected {} linking outside root to {}",
                    virtual_path,
                    canonical.display()
                );
                Err(DriverError::PathTraversal(virtual_path))
            }
            _ => Ok(()),
        }
    }

    /// Render a resolved path as a virtual path (`/a/b`) for messages.
    pub fn virtual_path(&self, real: &Path) -> String {
        match real.strip_prefix(&self.root) {
            Ok(rel) => {
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", parts.join("/"))
            }
            Err(_) => real.to_string_lossy().into_owned(),
        }
    }

    pub fn is_root(&self, real: &Path) -> bool {
        real == self.root
    }

    /// Canonicalize the deepest existing ancestor of `dir` and check that it
    /// sits under the root. Missing trailing segments are left to the
    /// filesystem call that follows, which will report them.
    fn contains_existing(&self, dir: &Path) -> bool {
        let mut probe = dir;
        loop {
            match probe.canonicalize() {
                Ok(canonical) => return canonical.starts_with(&self.root),
                Err(_) => match probe.parent() {
                    Some(parent) if probe.starts_with(&self.root) && probe != self.root => {
                        probe = parent
                    }
                    _ => return false,
                },
            }
        }
    }
}

/// Lexically normalize a virtual path into a root-relative one.
///
/// Returns `None` when a `..` would climb above the root.
fn normalize(path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    Some(parts.iter().collect())
}
