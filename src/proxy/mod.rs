//! Credential proxy bootstrap.
//!
//! This module prepares and launches the external credential proxy:
//! - Ephemeral CA generation for TLS interception
//! - Proxy configuration assembly (credentials, CA, proxy auth)
//! - Process supervision with bind-failure retries on fresh ports
//!
//! The proxy itself is an opaque binary. It reads a JSON configuration on
//! stdin, binds the requested loopback address, and either keeps running or
//! exits non-zero.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   ┌──────────────────────┐
//! │ CredentialResolver │   │ CertificateAuthority │
//! └─────────┬──────────┘   └──────────┬───────────┘
//!           └──────────┬──────────────┘
//!                      ▼
//!              ┌──────────────┐
//!              │ ProxyConfig  │  serialized once
//!              └──────┬───────┘
//!                     ▼
//!            ┌─────────────────┐  stdin   ┌────────────────┐
//!            │ ProxySupervisor │─────────►│ proxy binary   │
//!            └─────────────────┘  spawn   │ 127.0.0.1:port │
//!                                         └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use proxy_launcher::proxy::{
//!     CertificateAuthority, ProxyConfig, ProxySupervisor, RandomPortSelector,
//!     SupervisorSettings, TokioLauncher,
//! };
//!
//! let config = ProxyConfig::assemble(credentials, CertificateAuthority::generate()?, None);
//! let mut supervisor =
//!     ProxySupervisor::new(TokioLauncher, RandomPortSelector, SupervisorSettings::default());
//! let result = supervisor.start(&binary, &config, &log_file, &mut sink).await?;
//! ```

pub mod ca;
pub mod command;
pub mod config;
pub mod error;
pub mod port;
pub mod process;
pub mod supervisor;

pub use ca::{CertificateAuthority, CA_COMMON_NAME, CA_VALIDITY_YEARS};
pub use command::{ProxyCommand, STDIN_CONFIG_MARKER};
pub use config::ProxyConfig;
pub use error::{CaError, SupervisorError};
pub use port::{PortSelector, RandomPortSelector, EPHEMERAL_PORT_MAX, EPHEMERAL_PORT_MIN};
pub use process::{ProcessLauncher, ProxyProcess, Settled, SpawnedProxy, TokioLauncher};
pub use supervisor::{
    AttemptOutcome, LaunchResult, ProxySupervisor, SupervisorSettings, DEFAULT_HOST,
    DEFAULT_INITIAL_PORT, DEFAULT_MAX_ATTEMPTS, DEFAULT_SETTLE_DELAY, PID_STATE,
};
