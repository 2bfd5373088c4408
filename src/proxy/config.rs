//! Proxy runtime configuration.
//!
//! The configuration is assembled once, serialized once, and written to the
//! proxy's stdin on every spawn attempt:
//!
//! ```json
//! {"all_credentials": [...], "ca": {"cert": "...", "key": "..."}, "proxy_auth": {...}}
//! ```
//!
//! `proxy_auth` is omitted when no proxy password was supplied.

use serde::Serialize;

use super::ca::CertificateAuthority;
use crate::credentials::{Credential, ProxyAuthCredentials};

/// Configuration handed to the proxy binary.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyConfig {
    /// Registry credentials, in input order.
    #[serde(rename = "all_credentials")]
    pub credentials: Vec<Credential>,

    /// CA used to mint per-host certificates.
    pub ca: CertificateAuthority,

    /// Authentication required of clients connecting to the proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_auth: Option<ProxyAuthCredentials>,
}

impl ProxyConfig {
    /// Compose the configuration. No validation is performed; the proxy
    /// validates its own input.
    pub fn assemble(
        credentials: Vec<Credential>,
        ca: CertificateAuthority,
        proxy_auth: Option<ProxyAuthCredentials>,
    ) -> Self {
        Self {
            credentials,
            ca,
            proxy_auth,
        }
    }

    /// Serialize to the JSON document written to the proxy's stdin.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
