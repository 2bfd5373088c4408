//! Credential resolution from step inputs.
//!
//! Exactly one credential shape is honored per run:
//!
//! 1. `encoded_credentials`: base64 of a JSON list (takes precedence)
//! 2. `credentials`: the same JSON list in plain text
//! 3. Neither: an empty list

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use super::error::CredentialError;
use super::model::{Credential, ProxyAuthCredentials};
use crate::actions::InputSource;

/// Input carrying the base64-encoded credential list.
pub const ENCODED_CREDENTIALS_INPUT: &str = "encoded_credentials";

/// Input carrying the plaintext JSON credential list.
pub const CREDENTIALS_INPUT: &str = "credentials";

/// Input carrying the proxy password.
pub const PROXY_PASSWORD_INPUT: &str = "proxy_password";

/// Resolves credentials from an [`InputSource`].
pub struct CredentialResolver<'a, I: InputSource + ?Sized> {
    inputs: &'a I,
}

impl<'a, I: InputSource + ?Sized> CredentialResolver<'a, I> {
    /// Create a resolver over `inputs`.
    pub fn new(inputs: &'a I) -> Self {
        Self { inputs }
    }

    /// Resolve the registry credential list.
    ///
    /// # Errors
    ///
    /// Returns error if the selected input is not valid base64 or not a
    /// JSON list. The other input is never consulted as a
    /// fallback once one has been selected.
    pub fn resolve_registry_credentials(&self) -> Result<Vec<Credential>, CredentialError> {
        if let Some(encoded) = self.inputs.input(ENCODED_CREDENTIALS_INPUT) {
            debug!("Using credentials from '{}'", ENCODED_CREDENTIALS_INPUT);
            let decoded = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|source| CredentialError::Decode {
                    input: ENCODED_CREDENTIALS_INPUT,
                    source,
                })?;
            return serde_json::from_slice(&decoded).map_err(|source| CredentialError::Parse {
                input: ENCODED_CREDENTIALS_INPUT,
                source,
            });
        }

        match self.inputs.input(CREDENTIALS_INPUT) {
            Some(plain) => {
                debug!("Using credentials from '{}'", CREDENTIALS_INPUT);
                serde_json::from_str(&plain).map_err(|source| CredentialError::Parse {
                    input: CREDENTIALS_INPUT,
                    source,
                })
            }
            None => {
                debug!("No registry credentials supplied");
                Ok(Vec::new())
            }
        }
    }

    /// Resolve proxy-level authentication.
    ///
    /// `None` means the proxy accepts unauthenticated local connections.
    pub fn resolve_proxy_auth(&self) -> Option<ProxyAuthCredentials> {
        self.inputs
            .input(PROXY_PASSWORD_INPUT)
            .map(ProxyAuthCredentials::new)
    }
}
