//! Utilities module for logging, errors, and unit helpers
//!
//! This module provides:
//! - Structured logging with tracing
//! - Error handling types
//! - Size conversion helpers

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{BenchError, Result};
pub use logging::init_logging;

/// Bytes per megabyte (binary)
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to megabytes
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Format a megabyte value for log output
pub fn format_megabytes(mb: f64) -> String {
    if mb < 1.0 {
        format!("{:.1} KB", mb * 1024.0)
    } else if mb < 1024.0 {
        format!("{:.2} MB", mb)
    } else {
        format!("{:.2} GB", mb / 1024.0)
    }
}
