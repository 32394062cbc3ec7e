//! Navigation operations implementation

use log::debug;
use std::fs;

use crate::error::DriverError;
use crate::storage::validation::RootContext;

/// Confirms `target_path` exists and is a directory
pub fn change_directory(root: &RootContext, target_path: &str) -> Result<(), DriverError> {
    let real_path = root.resolve(target_path)?;
    let virtual_path = root.virtual_path(&real_path);

    let meta = fs::symlink_metadata(&real_path)
        .map_err(|e| DriverError::from_io("cwd", virtual_path.clone(), e))?;

    if !meta.is_dir() {
        return Err(DriverError::NotADirectory(virtual_path));
    }

    debug!("Change directory to {} allowed", virtual_path);
    Ok(())
}
