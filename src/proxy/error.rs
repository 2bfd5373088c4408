//! Error types for proxy bootstrap.
//!
//! - CA errors (key generation, self-signing)
//! - Supervisor errors (spawn failure, exhausted bind attempts)

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to certificate authority generation.
///
/// Fatal to startup; generation is never retried.
#[derive(Debug, Error)]
pub enum CaError {
    /// Failed to generate the RSA key pair.
    #[error("Failed to generate key pair: {0}")]
    KeyGeneration(String),

    /// Failed to build or self-sign the certificate.
    #[error("Failed to generate certificate: {0}")]
    CertGeneration(String),
}

/// Errors surfaced by the proxy supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The proxy binary could not be started at all.
    ///
    /// Not a bind failure, so no further attempts are made.
    #[error("Failed to spawn proxy binary {binary}: {source}")]
    Spawn {
        /// Binary that failed to start.
        binary: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Every attempt exited before the settle delay elapsed.
    #[error("Proxy failed to bind after {attempts} attempts (last exit: {})", describe_exit(.last_exit_code))]
    Exhausted {
        /// Number of spawn attempts made.
        attempts: u32,
        /// Exit code of the final attempt (`None` if killed by a signal).
        last_exit_code: Option<i32>,
    },

    /// The proxy configuration could not be serialized.
    #[error("Failed to serialize proxy configuration: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ca_error_display() {
        let err = CaError::KeyGeneration("random number generator failed".to_string());
        assert!(err.to_string().contains("random number generator failed"));
    }

    #[test]
    fn test_exhausted_display() {
        let err = SupervisorError::Exhausted {
            attempts: 5,
            last_exit_code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("code 1"));

        let err = SupervisorError::Exhausted {
            attempts: 5,
            last_exit_code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_spawn_display() {
        let err = SupervisorError::Spawn {
            binary: PathBuf::from("/opt/proxy/update-job-proxy"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/opt/proxy/update-job-proxy"));
        assert!(msg.contains("No such file"));
    }
}
