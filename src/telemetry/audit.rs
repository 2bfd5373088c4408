//! Audit log writer.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing::{error, info};

use super::error::TelemetryError;
use super::events::LaunchEvent;

/// `tracing` target that audit events are mirrored to.
pub const AUDIT_TARGET: &str = "launch_audit";

/// Global audit logger instance.
static AUDIT_LOGGER: OnceLock<AuditLogger> = OnceLock::new();

/// Fallback used before `init_logger()` runs.
static NULL_LOGGER: AuditLogger = AuditLogger { writer: None };

/// Audit logger that writes structured JSON events.
///
/// Every event is emitted on the [`AUDIT_TARGET`] tracing target. When an
/// audit file is configured the same JSON line is appended to it.
pub struct AuditLogger {
    /// Audit file protected by a mutex for interior mutability.
    /// None means events only go to tracing.
    writer: Option<Mutex<File>>,
}

impl AuditLogger {
    /// Create a logger appending to `path`.
    pub fn new(path: &Path) -> Result<Self, TelemetryError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| TelemetryError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            writer: Some(Mutex::new(file)),
        })
    }

    /// Create a logger that only mirrors events to tracing.
    pub fn new_null() -> Self {
        Self { writer: None }
    }

    /// Log an audit event.
    pub fn log(&self, event: LaunchEvent) {
        let json = match serde_json::to_string(&event.with_timestamp()) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize audit event: {}", e);
                return;
            }
        };

        info!(target: AUDIT_TARGET, "{}", json);

        let Some(ref writer) = self.writer else {
            return;
        };

        match writer.lock() {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{json}") {
                    error!("Failed to write audit log: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to acquire audit writer lock: {}", e);
            }
        }
    }

    /// Check if this logger has no audit file.
    pub fn is_null(&self) -> bool {
        self.writer.is_none()
    }
}

/// Initialize the global audit logger.
///
/// With `None`, events are only mirrored to tracing.
pub fn init_logger(path: Option<&Path>) -> Result<(), TelemetryError> {
    let logger = match path {
        Some(path) => AuditLogger::new(path)?,
        None => AuditLogger::new_null(),
    };

    AUDIT_LOGGER
        .set(logger)
        .map_err(|_| TelemetryError::AlreadyInitialized)
}

/// Get the global audit logger, or a null logger if not initialized.
pub fn audit() -> &'static AuditLogger {
    AUDIT_LOGGER.get().unwrap_or(&NULL_LOGGER)
}

/// Try to get a reference to the global audit logger.
///
/// Returns None if `init_logger()` was not called.
pub fn try_audit() -> Option<&'static AuditLogger> {
    AUDIT_LOGGER.get()
}
