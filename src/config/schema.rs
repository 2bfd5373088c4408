//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ConfigError;
use crate::proxy::SupervisorSettings;

/// Environment variable naming the runner's per-job temp directory.
pub const LOG_DIR_ENV: &str = "RUNNER_TEMP";

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Proxy launch settings.
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl Config {
    /// Merge another config into this one.
    ///
    /// Scalars are overridden when set in `other`.
    pub fn merge(&mut self, other: Config) {
        self.telemetry.merge(other.telemetry);
        self.proxy.merge(other.proxy);
    }
}

/// Telemetry settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// File receiving JSON audit events.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
}

impl TelemetryConfig {
    fn merge(&mut self, other: TelemetryConfig) {
        if other.audit_log.is_some() {
            self.audit_log = other.audit_log;
        }
    }
}

/// Proxy launch settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxySettings {
    /// Bind address (IP literal).
    #[serde(default)]
    pub host: String,

    /// First port tried. 0 = unset.
    #[serde(default)]
    pub initial_port: u16,

    /// Spawn attempts before giving up. 0 = unset.
    #[serde(default)]
    pub max_attempts: u32,

    /// Settle delay per attempt in milliseconds. 0 = unset.
    #[serde(default)]
    pub settle_delay_ms: u64,

    /// Path to the proxy executable.
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// Directory for the proxy log.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Proxy log file name.
    #[serde(default)]
    pub log_file_name: String,
}

impl ProxySettings {
    fn merge(&mut self, other: ProxySettings) {
        // Scalars are overridden if non-default
        if !other.host.is_empty() {
            self.host = other.host;
        }
        if other.initial_port != 0 {
            self.initial_port = other.initial_port;
        }
        if other.max_attempts != 0 {
            self.max_attempts = other.max_attempts;
        }
        if other.settle_delay_ms != 0 {
            self.settle_delay_ms = other.settle_delay_ms;
        }
        if other.binary.is_some() {
            self.binary = other.binary;
        }
        if other.log_dir.is_some() {
            self.log_dir = other.log_dir;
        }
        if !other.log_file_name.is_empty() {
            self.log_file_name = other.log_file_name;
        }
    }

    /// Validate and convert into supervisor settings.
    pub fn supervisor_settings(&self) -> Result<SupervisorSettings, ConfigError> {
        let host: IpAddr = self.host.parse().map_err(|_| ConfigError::InvalidValue {
            field: "proxy.host".to_string(),
            message: format!("'{}' is not an IP address", self.host),
        })?;

        if self.initial_port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "proxy.initial_port".to_string(),
                message: "must be between 1 and 65535".to_string(),
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "proxy.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(SupervisorSettings {
            host,
            initial_port: self.initial_port,
            max_attempts: self.max_attempts,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        })
    }

    /// Configured proxy binary.
    pub fn binary(&self) -> Result<&PathBuf, ConfigError> {
        self.binary.as_ref().ok_or(ConfigError::MissingBinary)
    }

    /// Full path of the proxy log file.
    ///
    /// The directory is `log_dir`, else `$RUNNER_TEMP`, else the OS temp dir.
    pub fn log_file_path(&self) -> PathBuf {
        let dir = self
            .log_dir
            .clone()
            .or_else(|| {
                std::env::var_os(LOG_DIR_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(std::env::temp_dir);
        dir.join(&self.log_file_name)
    }
}
