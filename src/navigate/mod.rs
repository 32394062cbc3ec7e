//! Navigate module
//!
//! Checks that a client may change into a directory. The working directory
//! itself is tracked by the transport session, not the driver.

mod operations;

pub use operations::change_directory;
