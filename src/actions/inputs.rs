//! Step input lookup.

use std::collections::HashMap;

/// Source of named step inputs.
///
/// Implementations return `None` for inputs that are unset or blank.
pub trait InputSource {
    /// Look up an input by name (e.g. `proxy_password`).
    fn input(&self, name: &str) -> Option<String>;
}

/// Environment variable holding the input `name`.
///
/// The runner upper-cases names and replaces spaces with underscores.
pub fn input_env_key(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Inputs read from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvInputs;

impl InputSource for EnvInputs {
    fn input(&self, name: &str) -> Option<String> {
        std::env::var(input_env_key(name))
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Fixed set of inputs, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticInputs {
    values: HashMap<String, String>,
}

impl StaticInputs {
    /// Create an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input value.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }
}

impl InputSource for StaticInputs {
    fn input(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_env_key() {
        assert_eq!(input_env_key("proxy_password"), "INPUT_PROXY_PASSWORD");
        assert_eq!(input_env_key("encoded credentials"), "INPUT_ENCODED_CREDENTIALS");
    }

    #[test]
    fn test_static_inputs_blank_is_absent() {
        let inputs = StaticInputs::new()
            .with("present", "  value  ")
            .with("blank", "   ");

        assert_eq!(inputs.input("present"), Some("value".to_string()));
        assert_eq!(inputs.input("blank"), None);
        assert_eq!(inputs.input("missing"), None);
    }
}
