//! Audit event types for launch telemetry.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Launch lifecycle events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LaunchEvent {
    /// Launch pipeline started.
    LaunchStart {
        /// Proxy binary being launched.
        binary: String,
        /// Number of registry credentials handed to the proxy.
        credentials: usize,
        /// Whether proxy-level authentication is configured.
        proxy_auth: bool,
    },

    /// A proxy process was spawned.
    AttemptSpawned {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Port requested for this attempt.
        port: u16,
        /// Pid of the spawned process.
        pid: Option<u32>,
    },

    /// A proxy exited non-zero during the settle delay.
    BindFailed {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Port that could not be bound.
        port: u16,
        /// Exit code (`None` if killed by a signal).
        exit_code: Option<i32>,
    },

    /// The proxy is up and has been released.
    ProxyBound {
        /// Bound host.
        host: String,
        /// Bound port.
        port: u16,
        /// Pid of the released process.
        pid: Option<u32>,
        /// Number of attempts it took.
        attempts: u32,
    },

    /// The launch failed.
    LaunchFailed {
        /// Human-readable failure description.
        reason: String,
    },

    /// A previously launched proxy was stopped.
    Teardown {
        /// Pid that was targeted.
        pid: u32,
        /// What happened.
        outcome: TeardownOutcome,
    },
}

/// Result of a teardown request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownOutcome {
    /// SIGTERM delivered.
    Terminated,
    /// Process was already gone.
    NotRunning,
}

/// Wrapper for serializing events with timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct TimestampedEvent<'a> {
    /// ISO8601 timestamp.
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    /// The actual event (flattened into this struct).
    #[serde(flatten)]
    pub event: &'a LaunchEvent,
}

impl LaunchEvent {
    /// Wrap this event with a timestamp for serialization.
    pub fn with_timestamp(&self) -> TimestampedEvent<'_> {
        TimestampedEvent {
            timestamp: Utc::now(),
            event: self,
        }
    }
}
