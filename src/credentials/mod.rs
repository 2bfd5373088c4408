//! Registry and proxy credentials.
//!
//! Registry credentials are passed through to the proxy untouched: whatever
//! fields an entry carries are serialized back out verbatim. Nothing here is
//! ever written to disk.

mod error;
mod model;
mod resolver;

pub use error::CredentialError;
pub use model::{Credential, ProxyAuthCredentials, PROXY_USERNAME};
pub use resolver::{
    CredentialResolver, CREDENTIALS_INPUT, ENCODED_CREDENTIALS_INPUT, PROXY_PASSWORD_INPUT,
};
