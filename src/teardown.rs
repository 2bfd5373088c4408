//! Proxy teardown for the post step.
//!
//! The proxy is released at launch and outlives `start`. The post step reads
//! the pid persisted under `proxy_pid` and sends it SIGTERM.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tracing::{info, warn};

use crate::proxy::PID_STATE;
use crate::telemetry::{self, LaunchEvent, TeardownOutcome};

/// Errors that can occur while stopping the proxy.
#[derive(Debug, Error)]
pub enum TeardownError {
    /// The persisted pid could not be parsed.
    #[error("Invalid proxy pid '{value}'")]
    InvalidPid {
        /// Raw value that was read.
        value: String,
    },

    /// Signal delivery failed for a reason other than a missing process.
    #[error("Failed to signal proxy pid {pid}: {source}")]
    Signal {
        /// Targeted pid.
        pid: u32,
        /// The underlying errno.
        source: Errno,
    },
}

/// Environment variable the runner exposes the persisted pid under.
pub fn pid_state_env() -> String {
    format!("STATE_{}", PID_STATE)
}

/// Pid recorded by `start`, if any.
pub fn persisted_pid() -> Result<Option<u32>, TeardownError> {
    match std::env::var(pid_state_env()) {
        Ok(value) if !value.trim().is_empty() => parse_pid(&value).map(Some),
        _ => Ok(None),
    }
}

fn parse_pid(value: &str) -> Result<u32, TeardownError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&pid| pid > 0 && i32::try_from(pid).is_ok())
        .ok_or_else(|| TeardownError::InvalidPid {
            value: value.to_string(),
        })
}

/// Check if a process with the given PID exists.
pub fn process_exists(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // EPERM still means the process exists.
    !matches!(kill(Pid::from_raw(raw), None), Err(Errno::ESRCH))
}

/// Send SIGTERM to `pid`.
///
/// A process that is already gone is not an error.
pub fn terminate(pid: u32) -> Result<TeardownOutcome, TeardownError> {
    let raw = i32::try_from(pid).map_err(|_| TeardownError::InvalidPid {
        value: pid.to_string(),
    })?;

    let outcome = if !process_exists(pid) {
        info!("Proxy pid {} is not running", pid);
        TeardownOutcome::NotRunning
    } else {
        match kill(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => {
                info!("Sent SIGTERM to proxy pid {}", pid);
                TeardownOutcome::Terminated
            }
            // Exited between the check and the signal.
            Err(Errno::ESRCH) => TeardownOutcome::NotRunning,
            Err(source) => return Err(TeardownError::Signal { pid, source }),
        }
    };

    telemetry::audit().log(LaunchEvent::Teardown { pid, outcome });
    Ok(outcome)
}

/// Stop the proxy named by `pid`, or by the persisted state when `None`.
///
/// Returns `None` when no pid is known.
pub fn stop(pid: Option<u32>) -> Result<Option<TeardownOutcome>, TeardownError> {
    let pid = match pid {
        Some(pid) => Some(pid),
        None => persisted_pid()?,
    };

    match pid {
        Some(pid) => terminate(pid).map(Some),
        None => {
            warn!("No proxy pid recorded, nothing to stop");
            Ok(None)
        }
    }
}
