//! Tracing/logging setup shared by every process that hosts the order services.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, TracingConfig, init, init_for_tests, init_with};
