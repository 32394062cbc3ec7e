//! Error types
//!
//! Defines the error returned by every storage driver operation.

use std::fmt;
use std::io;

/// Broad category of a [`DriverError`], used by the transport layer to pick
/// a protocol-level response without inspecting filesystem internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    WrongType,
    Precondition,
    Filesystem,
    Security,
}

/// Storage driver errors
///
/// Paths carried by the variants are virtual paths (`/reports/q1.txt`),
/// never the real location under the root.
#[derive(Debug)]
pub enum DriverError {
    NotFound(String),
    NotADirectory(String),
    NotAFile(String),
    DirectoryCollision(String),
    AppendTargetMissing(String),
    PathTraversal(String),
    InvalidRoot(String),
    Io {
        op: &'static str,
        path: String,
        source: io::Error,
    },
}

impl DriverError {
    /// Wraps an io error, keeping the operation and path for diagnostics.
    pub fn io(op: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        DriverError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Like [`DriverError::io`], but a missing entry becomes `NotFound`.
    pub fn from_io(op: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            DriverError::NotFound(path)
        } else {
            DriverError::Io { op, path, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::NotFound(_) => ErrorKind::NotFound,
            DriverError::NotADirectory(_)
            | DriverError::NotAFile(_)
            | DriverError::DirectoryCollision(_) => ErrorKind::WrongType,
            DriverError::AppendTargetMissing(_) => ErrorKind::Precondition,
            DriverError::PathTraversal(_) => ErrorKind::Security,
            DriverError::InvalidRoot(_) | DriverError::Io { .. } => ErrorKind::Filesystem,
        }
    }

    /// Virtual path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            DriverError::NotFound(p)
            | DriverError::NotADirectory(p)
            | DriverError::NotAFile(p)
            | DriverError::DirectoryCollision(p)
            | DriverError::AppendTargetMissing(p)
            | DriverError::PathTraversal(p)
            | DriverError::InvalidRoot(p) => p,
            DriverError::Io { path, .. } => path,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotFound(p) => write!(f, "No such file or directory: {}", p),
            DriverError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            DriverError::NotAFile(p) => write!(f, "Not a file: {}", p),
            DriverError::DirectoryCollision(p) => {
                write!(f, "A directory has the same name: {}", p)
            }
            DriverError::AppendTargetMissing(p) => {
                write!(f, "Append requested but file does not exist: {}", p)
            }
            DriverError::PathTraversal(p) => write!(f, "Path escapes the root directory: {}", p),
            DriverError::InvalidRoot(p) => write!(f, "Invalid root directory: {}", p),
            DriverError::Io { op, path, source } => write!(f, "{} {} failed: {}", op, path, source),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
