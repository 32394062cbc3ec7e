//! Transfer module
//!
//! Handles file downloads from and uploads into the driver root.

pub mod file_ops;
pub mod modes;

pub use file_ops::{TransferOptions, get_file, put_file};
pub use modes::{ReplacePolicy, WriteMode};
