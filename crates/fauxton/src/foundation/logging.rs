//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging at a fixed level, ignoring repeated calls
///
/// Meant for tests, where every test may try to install the logger.
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .is_test(true)
        .try_init();
}
