//! Telemetry error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during telemetry operations.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to open the audit file.
    #[error("Failed to open audit log {path}: {source}")]
    Open {
        /// Path of the audit file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Logger already initialized.
    #[error("Audit logger already initialized")]
    AlreadyInitialized,
}
