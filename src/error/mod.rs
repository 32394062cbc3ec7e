//! Error handling
//!
//! Defines the driver error type and helpers for reporting it.

pub mod handlers;
pub mod types;

pub use types::*;
