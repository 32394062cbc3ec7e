//! RAX storage driver
//!
//! Local-filesystem storage back-end for the RAX FTP server. Every operation
//! is confined to one root directory and reports its outcome to the caller.

pub mod config;
pub mod driver;
pub mod error;
pub mod navigate;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use config::DriverConfig;
pub use driver::{AsyncFileDriver, DriverFactory, FileDriver, FileDriverFactory, StorageDriver};
pub use error::{DriverError, ErrorKind};
pub use storage::{FileMetadata, Identity};
pub use transfer::{ReplacePolicy, WriteMode};
