//! Logging utilities
//!
//! Provides logging setup for embedding services and tests.

/// Setup logging from `RUST_LOG`; later calls are ignored
pub fn setup_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
