//! proxy-launcher: bootstraps a credential-injecting forward proxy.
//!
//! A dependency update job reaches package registries through a local proxy
//! that injects registry credentials and intercepts TLS. This crate prepares
//! that proxy and keeps it running.
//!
//! # Launch Flow
//!
//! 1. Resolve registry credentials and the optional proxy password from step
//!    inputs
//! 2. Generate a fresh RSA certificate authority
//! 3. Serialize credentials, CA and proxy auth into one JSON configuration
//! 4. Spawn the proxy binary with the configuration on stdin, retrying on
//!    fresh ports when it fails to bind
//! 5. Publish the bound address and CA certificate as step outputs
//!
//! # Architecture
//!
//! - **Actions**: step inputs, outputs, state and workflow commands
//! - **Credentials**: credential models and input resolution
//! - **Proxy**: CA generation, config assembly and process supervision
//! - **Config**: Hierarchical TOML configuration with embedded defaults
//! - **Telemetry**: JSON audit events for the launch lifecycle
//! - **Teardown**: stopping the released proxy from the post step

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod actions;
pub mod cli;
pub mod cli_handler;
pub mod config;
pub mod credentials;
pub mod orchestrator;
pub mod proxy;
pub mod teardown;
pub mod telemetry;
