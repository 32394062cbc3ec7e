//! File system storage management
//!
//! Handles path confinement, metadata and directory operations.

pub mod metadata;
pub mod operations;
pub mod validation;

pub use metadata::{FileMetadata, Identity, stat};
pub use operations::{delete_directory, delete_file, list_directory, make_directory, rename};
pub use validation::RootContext;
