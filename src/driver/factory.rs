//! Driver factory
//!
//! Hands out one driver per transport session, all bound to the same root.

use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::config::DriverConfig;
use crate::driver::{DriverSettings, FileDriver, StorageDriver};
use crate::error::Result;
use crate::storage::{Identity, RootContext};
use crate::transfer::TransferOptions;

/// Creates storage drivers for new sessions
pub trait DriverFactory {
    type Driver: StorageDriver;

    fn new_driver(&self) -> Result<Self::Driver>;
}

/// Factory for [`FileDriver`]s rooted at one directory
#[derive(Debug, Clone)]
pub struct FileDriverFactory {
    settings: Arc<DriverSettings>,
}

impl FileDriverFactory {
    /// Factory rooted at `root` with default identity and transfer settings
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(&DriverConfig::new(root))
    }

    /// Build a factory from loaded configuration.
    ///
    /// Fails if the configured root does not exist or is not a directory.
    pub fn from_config(config: &DriverConfig) -> Result<Self> {
        let root = RootContext::new(config.root_path_buf())?;

        info!(
            "Storage driver root: {} (owner {}, group {}, {:?})",
            root.path().display(),
            config.owner,
            config.group,
            config.replace_policy
        );

        Ok(Self {
            settings: Arc::new(DriverSettings {
                root,
                identity: Identity::new(config.owner.clone(), config.group.clone()),
                transfer: TransferOptions {
                    buffer_size: config.buffer_size,
                    replace_policy: config.replace_policy,
                    sync_on_close: config.sync_on_close,
                },
            }),
        })
    }

    pub fn root(&self) -> &RootContext {
        &self.settings.root
    }
}

impl DriverFactory for FileDriverFactory {
    type Driver = FileDriver;

    fn new_driver(&self) -> Result<FileDriver> {
        Ok(FileDriver::with_settings(Arc::clone(&self.settings)))
    }
}
