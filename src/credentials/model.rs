//! Credential data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed username the job presents to the local proxy.
pub const PROXY_USERNAME: &str = "dependabot";

/// Keys whose values never appear in `Debug` output.
const SECRET_KEYS: &[&str] = &["password", "token"];

/// Auth material for one registry.
///
/// Entries are opaque to the launcher and handed to the proxy exactly as
/// supplied: any JSON value is accepted, explicit `null`s and non-string
/// fields included. Accessors read the common keys when they are strings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(Value);

impl Credential {
    /// Wrap a raw entry.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Registry kind discriminator, e.g. `npm_registry` or `git_source`.
    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Registry host the credential applies to.
    pub fn host(&self) -> Option<&str> {
        self.str_field("host")
    }

    /// Raw value of `key`, if the entry is an object carrying it.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|map| map.get(key))
    }

    /// The entry as supplied.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}

impl From<Value> for Credential {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(map) = self.0.as_object() else {
            return f.debug_tuple("Credential").field(&"<opaque>").finish();
        };

        let mut s = f.debug_struct("Credential");
        for (key, value) in map {
            if SECRET_KEYS.contains(&key.as_str()) && !value.is_null() {
                s.field(key, &"<redacted>");
            } else {
                s.field(key, value);
            }
        }
        s.finish()
    }
}

/// Credentials the job uses to authenticate to the proxy itself.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyAuthCredentials {
    /// Always [`PROXY_USERNAME`].
    pub username: String,
    /// Password from the `proxy_password` input.
    pub password: String,
}

impl ProxyAuthCredentials {
    /// Pair `password` with the fixed proxy username.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            username: PROXY_USERNAME.to_string(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ProxyAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({
            "type": "maven_repository",
            "url": "https://repo.example.com/maven",
            "username": "ci",
            "password": "hunter2",
            "replaces-base": true
        });

        let credential: Credential = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(credential.kind(), Some("maven_repository"));
        assert!(credential.host().is_none());
        assert_eq!(credential.field("url"), Some(&json!("https://repo.example.com/maven")));

        assert_eq!(serde_json::to_value(&credential).unwrap(), raw);
    }

    #[test]
    fn test_nulls_and_non_strings_round_trip() {
        let raw = json!([
            {"type": "npm_registry", "host": "registry.npmjs.org", "token": "abc", "username": null},
            {"type": "maven_repository", "password": 12345, "port": 8443},
            "bare-string-entry",
            42,
            null
        ]);

        let credentials: Vec<Credential> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(credentials.len(), 5);
        assert_eq!(credentials[0].field("username"), Some(&Value::Null));
        assert!(credentials[1].kind().is_some());
        assert!(credentials[2].kind().is_none());
        assert!(credentials[3].field("type").is_none());

        assert_eq!(serde_json::to_value(&credentials).unwrap(), raw);
    }

    #[test]
    fn test_key_order_preserved() {
        let text = r#"{"type":"npm_registry","token":"abc","host":"registry.npmjs.org","alias":null}"#;
        let credential: Credential = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&credential).unwrap(), text);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::new(json!({
            "type": "npm_registry",
            "host": "registry.npmjs.org",
            "token": "npm_secret_token",
            "password": "hunter2"
        }));

        let debug = format!("{:?}", credential);
        assert!(debug.contains("registry.npmjs.org"));
        assert!(!debug.contains("npm_secret_token"));
        assert!(!debug.contains("hunter2"));

        let numeric = Credential::new(json!({"password": 987654}));
        assert!(!format!("{:?}", numeric).contains("987654"));

        let bare = Credential::new(json!("ghp_bare_token"));
        assert!(!format!("{:?}", bare).contains("ghp_bare_token"));

        let auth = ProxyAuthCredentials::new("proxy-secret");
        let debug = format!("{:?}", auth);
        assert!(debug.contains(PROXY_USERNAME));
        assert!(!debug.contains("proxy-secret"));
    }
}
