//! Error handlers
//!
//! Helpers the transport layer uses to turn driver errors into replies.

use crate::error::types::{DriverError, ErrorKind};
use log::{error, warn};
use std::io;

/// Log a failed driver operation
pub fn report_error(op: &str, err: &DriverError) {
    match err.kind() {
        ErrorKind::Filesystem => error!("Storage {} failed: {}", op, err),
        ErrorKind::Security => warn!("Rejected {}: {}", op, err),
        _ => warn!("Storage {} refused: {}", op, err),
    }
}

/// Convert error to FTP response code
pub fn error_to_ftp_code(err: &DriverError) -> u16 {
    match err {
        DriverError::NotFound(_)
        | DriverError::NotADirectory(_)
        | DriverError::NotAFile(_)
        | DriverError::DirectoryCollision(_) => 550,
        DriverError::AppendTargetMissing(_) => 450,
        DriverError::PathTraversal(_) => 553,
        DriverError::InvalidRoot(_) => 451,
        DriverError::Io { source, .. } => match source.kind() {
            io::ErrorKind::StorageFull => 452,
            io::ErrorKind::PermissionDenied => 550,
            _ => 451,
        },
    }
}
