//! Telemetry and audit logging for proxy-launcher.
//!
//! # Architecture
//!
//! - **Audit events**: launch lifecycle events serialized as JSON lines with an
//!   ISO8601 timestamp, appended to an optional audit file and mirrored to
//!   `tracing` on the `launch_audit` target
//! - **Debug logging** (`tracing`): development logs go to stderr
//!
//! # Usage
//!
//! ```ignore
//! use proxy_launcher::telemetry::{self, LaunchEvent};
//!
//! telemetry::init_logger(Some(Path::new("/tmp/launch-audit.jsonl")))?;
//!
//! telemetry::audit().log(LaunchEvent::BindFailed {
//!     attempt: 1,
//!     port: 49152,
//!     exit_code: Some(1),
//! });
//! ```
//!
//! # Event Format
//!
//! ```json
//! {"ts":"2026-01-07T14:32:01Z","event":"bind_failed","attempt":1,"port":49152,"exit_code":1}
//! ```

mod audit;
mod error;
mod events;

pub use audit::{audit, init_logger, try_audit, AuditLogger, AUDIT_TARGET};
pub use error::TelemetryError;
pub use events::{LaunchEvent, TeardownOutcome, TimestampedEvent};
