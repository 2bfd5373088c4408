//! Configuration system for proxy-launcher.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded from multiple sources and merged in order:
//!
//! 1. Embedded defaults (`config/default.toml`)
//! 2. System config: `/etc/proxy-launcher/config.toml`
//! 3. User config: `~/.config/proxy-launcher/config.toml`
//! 4. Additional config file (via `--config` flag)
//! 5. CLI flags (highest priority)
//!
//! Missing system and user files are skipped. Scalars are overridden when
//! the later source sets them.
//!
//! Credentials are never read from these files; they arrive as step inputs.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{ConfigLoader, SYSTEM_CONFIG_PATH};
pub use schema::{Config, ProxySettings, TelemetryConfig, LOG_DIR_ENV};
