//! Proxy process supervision.
//!
//! The supervisor launches the proxy binary and infers whether it managed to
//! bind its port. There is no handshake: a proxy that is still alive after
//! the settle delay is assumed bound, and one that exits non-zero within the
//! delay is assumed to have hit a port collision.
//!
//! # Attempt Loop
//!
//! ```text
//! Idle ──► Spawning ──► AwaitingSignal ──┬──► Bound      (alive after delay)
//!             ▲                          ├──► Retrying   (non-zero exit)
//!             └──────────────────────────┘    │
//!                                             └──► Failed (spawn error or
//!                                                          attempts exhausted)
//! ```
//!
//! Every attempt reuses the same serialized configuration, so the CA is
//! generated once per launch. After a bind failure the next port is drawn
//! uniformly from the ephemeral range, whatever the cause of the exit.
//!
//! # Known Limitation
//!
//! The settle delay is the only liveness signal. A proxy that binds slowly
//! and then fails is reported as started, and one that starts slower than the
//! delay but would have succeeded is not distinguished from a healthy one.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::command::ProxyCommand;
use super::config::ProxyConfig;
use super::error::SupervisorError;
use super::port::{PortSelector, EPHEMERAL_PORT_MIN};
use super::process::{ProcessLauncher, ProxyProcess, Settled};
use crate::actions::StateSink;
use crate::telemetry::{self, LaunchEvent};

/// Loopback address the proxy binds.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Port tried on the first attempt.
pub const DEFAULT_INITIAL_PORT: u16 = EPHEMERAL_PORT_MIN;

/// Maximum number of spawn attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Time a fresh proxy gets to fail visibly.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// State name under which each attempt's pid is persisted.
pub const PID_STATE: &str = "proxy_pid";

/// Tunables for the attempt loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Address the proxy binds.
    pub host: IpAddr,
    /// Port tried on the first attempt.
    pub initial_port: u16,
    /// Maximum number of spawn attempts.
    pub max_attempts: u32,
    /// Settle delay per attempt.
    pub settle_delay: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            initial_port: DEFAULT_INITIAL_PORT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Result of a single spawn attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// No failure observed within the settle delay. The process was released.
    Bound {
        /// Pid of the released process.
        pid: Option<u32>,
    },
    /// Exited non-zero within the settle delay.
    BindFailed {
        /// Exit code (`None` if killed by a signal).
        exit_code: Option<i32>,
        /// Port to try next.
        next_port: u16,
    },
    /// The process could not be created.
    SpawnError(std::io::Error),
}

/// A proxy that is up and listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResult {
    /// Address the proxy bound.
    pub host: IpAddr,
    /// Port the proxy bound.
    pub port: u16,
    /// PEM of the CA the proxy presents. Never the private key.
    pub ca_cert: String,
    /// Pid of the released proxy process.
    pub pid: Option<u32>,
    /// Number of spawn attempts it took.
    pub attempts: u32,
}

/// Launches the proxy and retries bind failures on fresh ports.
pub struct ProxySupervisor<L, P> {
    launcher: L,
    ports: P,
    settings: SupervisorSettings,
}

impl<L: ProcessLauncher, P: PortSelector> ProxySupervisor<L, P> {
    /// Create a supervisor.
    pub fn new(launcher: L, ports: P, settings: SupervisorSettings) -> Self {
        Self {
            launcher,
            ports,
            settings,
        }
    }

    /// The process launcher in use.
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Launch `binary` with `config` and wait for it to bind.
    ///
    /// Each attempt's pid is persisted through `sink` under [`PID_STATE`] as
    /// soon as it is known. No outputs are written here.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::Spawn`] on the first attempt that cannot be
    ///   created; no further attempts follow
    /// - [`SupervisorError::Exhausted`] when every attempt exits non-zero
    pub async fn start(
        &mut self,
        binary: &Path,
        config: &ProxyConfig,
        log_file: &Path,
        sink: &mut dyn StateSink,
    ) -> Result<LaunchResult, SupervisorError> {
        let payload = config.to_json()?;
        let host = self.settings.host;
        let mut port = self.settings.initial_port;
        let mut last_exit_code = None;

        for attempt in 1..=self.settings.max_attempts {
            let command = ProxyCommand::new(binary)
                .listen(SocketAddr::new(host, port))
                .config_from_stdin()
                .log_file(log_file);

            info!(
                "Starting proxy on {}:{} (attempt {}/{})",
                host, port, attempt, self.settings.max_attempts
            );

            match self.attempt(&command, &payload, sink, attempt).await {
                AttemptOutcome::Bound { pid } => {
                    info!("Proxy listening on {}:{} (pid {:?})", host, port, pid);
                    telemetry::audit().log(LaunchEvent::ProxyBound {
                        host: host.to_string(),
                        port,
                        pid,
                        attempts: attempt,
                    });
                    return Ok(LaunchResult {
                        host,
                        port,
                        ca_cert: config.ca.cert_pem().to_string(),
                        pid,
                        attempts: attempt,
                    });
                }
                AttemptOutcome::BindFailed {
                    exit_code,
                    next_port,
                } => {
                    warn!(
                        "Proxy exited with {:?} on port {}, retrying on port {}",
                        exit_code, port, next_port
                    );
                    telemetry::audit().log(LaunchEvent::BindFailed {
                        attempt,
                        port,
                        exit_code,
                    });
                    last_exit_code = exit_code;
                    port = next_port;
                }
                AttemptOutcome::SpawnError(source) => {
                    return Err(SupervisorError::Spawn {
                        binary: binary.to_path_buf(),
                        source,
                    });
                }
            }
        }

        Err(SupervisorError::Exhausted {
            attempts: self.settings.max_attempts,
            last_exit_code,
        })
    }

    /// Run one spawn attempt to its outcome.
    ///
    /// Only a non-zero (or signal) exit counts as a failure. A process that
    /// exits with code 0 inside the delay produced no failure signal and is
    /// reported as bound.
    pub async fn attempt(
        &mut self,
        command: &ProxyCommand,
        payload: &[u8],
        sink: &mut dyn StateSink,
        attempt: u32,
    ) -> AttemptOutcome {
        let mut process = match self.launcher.spawn(command, payload).await {
            Ok(process) => process,
            Err(e) => return AttemptOutcome::SpawnError(e),
        };

        let pid = process.pid();
        if let Some(pid) = pid
            && let Err(e) = sink.save_state(PID_STATE, &pid.to_string())
        {
            warn!("Failed to persist proxy pid {}: {}", pid, e);
        }
        telemetry::audit().log(LaunchEvent::AttemptSpawned {
            attempt,
            port: command.listen_addr().map_or(0, |addr| addr.port()),
            pid,
        });

        match process.settle(self.settings.settle_delay).await {
            Settled::Exited(code) if code != Some(0) => AttemptOutcome::BindFailed {
                exit_code: code,
                next_port: self.ports.next_port(),
            },
            Settled::Exited(_) => {
                warn!("Proxy exited cleanly within the settle delay; treating it as started");
                process.release();
                AttemptOutcome::Bound { pid }
            }
            Settled::Running => {
                debug!("Proxy still running after {:?}", self.settings.settle_delay);
                process.release();
                AttemptOutcome::Bound { pid }
            }
        }
    }
}
