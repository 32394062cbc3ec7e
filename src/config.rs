//! Configuration management for the RAX storage driver
//!
//! Settings are fixed once a driver factory is built; nothing here is
//! updatable at runtime.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::transfer::ReplacePolicy;
use crate::transfer::file_ops::DEFAULT_BUFFER_SIZE;

/// Storage driver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriverConfig {
    /// Directory every driver operation is confined to
    /// Environment: RAX_FS_ROOT_PATH
    pub root_path: String,

    /// Owner reported for every entry
    #[serde(default = "default_identity")]
    pub owner: String,

    /// Group reported for every entry
    #[serde(default = "default_identity")]
    pub group: String,

    /// Buffer size for file transfers
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// How replace-mode uploads treat an existing file
    #[serde(default)]
    pub replace_policy: ReplacePolicy,

    /// Flush uploads to disk before reporting success
    #[serde(default)]
    pub sync_on_close: bool,
}

fn default_identity() -> String {
    "root".to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl DriverConfig {
    /// Build a configuration rooted at `root` with default settings
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_string_lossy().into_owned(),
            owner: default_identity(),
            group: default_identity(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            replace_policy: ReplacePolicy::default(),
            sync_on_close: false,
        }
    }

    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["rax-fs-driver/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("RAX_FS").try_parsing(true))
                .build()
            {
                Ok(settings) => {
                    let config: DriverConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!("no configuration found in {config_paths:?}"))
        }))
    }

    /// Load configuration from an explicit file with environment overrides
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("RAX_FS").try_parsing(true))
            .build()?;

        let config: DriverConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.root_path.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "root_path cannot be empty".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.owner.is_empty() || self.group.is_empty() {
            return Err(config::ConfigError::Message(
                "owner and group cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get root path as PathBuf
    pub fn root_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.root_path)
    }
}
