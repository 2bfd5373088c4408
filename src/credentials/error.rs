//! Credential resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving registry credentials.
///
/// All of these are fatal: they abort startup before any proxy is spawned.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The encoded credentials input is not valid base64.
    #[error("Failed to decode {input}: {source}")]
    Decode {
        /// Name of the offending input.
        input: &'static str,
        /// The underlying base64 error.
        source: base64::DecodeError,
    },

    /// The credentials input is not a JSON list.
    #[error("Failed to parse {input}: {source}")]
    Parse {
        /// Name of the offending input.
        input: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
