//! Storage driver
//!
//! The operation set a file-transfer service calls into, and the local
//! filesystem implementation of it.

pub mod async_adapter;
pub mod factory;

pub use async_adapter::AsyncFileDriver;
pub use factory::{DriverFactory, FileDriverFactory};

use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use crate::error::Result;
use crate::navigate;
use crate::storage::{self, FileMetadata, Identity, RootContext};
use crate::transfer::{self, TransferOptions, WriteMode};

/// Operations a transport session performs against its storage.
///
/// Each call resolves its own path and either completes or returns an
/// error; nothing is carried between calls apart from the root.
pub trait StorageDriver {
    /// Handle returned by [`StorageDriver::get_file`]
    type Reader: Read;

    fn change_dir(&self, path: &str) -> Result<()>;

    fn stat(&self, path: &str) -> Result<FileMetadata>;

    fn list_directory(&self, path: &str) -> Result<Vec<FileMetadata>>;

    fn make_dir(&self, path: &str) -> Result<()>;

    fn delete_dir(&self, path: &str) -> Result<()>;

    fn delete_file(&self, path: &str) -> Result<()>;

    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Returns the file's full size and a reader positioned at `offset`.
    fn get_file(&self, path: &str, offset: u64) -> Result<(u64, Self::Reader)>;

    /// Copies `data` into `path`, replacing or appending. Returns the number
    /// of bytes written.
    fn put_file(&self, path: &str, data: &mut dyn Read, append: bool) -> Result<u64>;
}

/// Immutable settings shared by the drivers of one factory
#[derive(Debug)]
pub(crate) struct DriverSettings {
    pub(crate) root: RootContext,
    pub(crate) identity: Identity,
    pub(crate) transfer: TransferOptions,
}

/// Storage driver backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FileDriver {
    settings: Arc<DriverSettings>,
}

impl FileDriver {
    pub(crate) fn with_settings(settings: Arc<DriverSettings>) -> Self {
        Self { settings }
    }

    pub fn root(&self) -> &RootContext {
        &self.settings.root
    }

    pub fn identity(&self) -> &Identity {
        &self.settings.identity
    }

    pub fn transfer_options(&self) -> &TransferOptions {
        &self.settings.transfer
    }
}

impl StorageDriver for FileDriver {
    type Reader = File;

    fn change_dir(&self, path: &str) -> Result<()> {
        navigate::change_directory(self.root(), path)
    }

    fn stat(&self, path: &str) -> Result<FileMetadata> {
        storage::stat(self.root(), self.identity(), path)
    }

    fn list_directory(&self, path: &str) -> Result<Vec<FileMetadata>> {
        storage::list_directory(self.root(), self.identity(), path)
    }

    fn make_dir(&self, path: &str) -> Result<()> {
        storage::make_directory(self.root(), path)
    }

    fn delete_dir(&self, path: &str) -> Result<()> {
        storage::delete_directory(self.root(), path)
    }

    fn delete_file(&self, path: &str) -> Result<()> {
        storage::delete_file(self.root(), path)
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        storage::rename(self.root(), from, to)
    }

    fn get_file(&self, path: &str, offset: u64) -> Result<(u64, File)> {
        transfer::get_file(self.root(), path, offset)
    }

    fn put_file(&self, path: &str, data: &mut dyn Read, append: bool) -> Result<u64> {
        transfer::put_file(
            self.root(),
            path,
            data,
            WriteMode::from_append_flag(append),
            self.transfer_options(),
        )
    }
}
