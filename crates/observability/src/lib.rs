//! Process-wide logging setup shared by the binaries.

/// Tracing subscriber configuration (filter, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize logging with the format from `RESTOCK_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
