//! Launch orchestration.
//!
//! Wires the credential, CA and supervisor pieces together for one `start`
//! run and publishes the result as step outputs.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::actions::{InputSource, StateSink};
use crate::credentials::CredentialResolver;
use crate::proxy::{
    CertificateAuthority, LaunchResult, PortSelector, ProcessLauncher, ProxyConfig,
    ProxySupervisor, SupervisorSettings,
};
use crate::telemetry::{self, LaunchEvent};

/// Output carrying the proxy host.
pub const HOST_OUTPUT: &str = "proxy_host";

/// Output carrying the proxy port.
pub const PORT_OUTPUT: &str = "proxy_port";

/// Output carrying the PEM certificate of the proxy CA.
pub const CA_CERT_OUTPUT: &str = "proxy_ca_cert";

/// State carrying the proxy log file path.
pub const LOG_PATH_STATE: &str = "proxy_log_path";

/// Resolve credentials, generate a CA and start the proxy.
///
/// Outputs are written only once the proxy is bound. On failure nothing is
/// published and a `LaunchFailed` audit event is emitted.
pub async fn start_proxy<I, L, P>(
    inputs: &I,
    launcher: L,
    ports: P,
    binary: &Path,
    log_file: &Path,
    settings: SupervisorSettings,
    sink: &mut dyn StateSink,
) -> Result<LaunchResult>
where
    I: InputSource + ?Sized,
    L: ProcessLauncher,
    P: PortSelector,
{
    let result = launch(inputs, launcher, ports, binary, log_file, settings, sink).await;
    if let Err(ref e) = result {
        telemetry::audit().log(LaunchEvent::LaunchFailed {
            reason: format!("{:#}", e),
        });
    }
    result
}

async fn launch<I, L, P>(
    inputs: &I,
    launcher: L,
    ports: P,
    binary: &Path,
    log_file: &Path,
    settings: SupervisorSettings,
    sink: &mut dyn StateSink,
) -> Result<LaunchResult>
where
    I: InputSource + ?Sized,
    L: ProcessLauncher,
    P: PortSelector,
{
    let resolver = CredentialResolver::new(inputs);
    let credentials = resolver
        .resolve_registry_credentials()
        .context("Failed to resolve registry credentials")?;
    let proxy_auth = resolver.resolve_proxy_auth();
    debug!(
        "Resolved {} registry credential(s), proxy auth: {}",
        credentials.len(),
        proxy_auth.is_some()
    );

    telemetry::audit().log(LaunchEvent::LaunchStart {
        binary: binary.display().to_string(),
        credentials: credentials.len(),
        proxy_auth: proxy_auth.is_some(),
    });

    let ca = CertificateAuthority::generate().context("Failed to generate proxy CA")?;
    let config = ProxyConfig::assemble(credentials, ca, proxy_auth);

    sink.save_state(LOG_PATH_STATE, &log_file.display().to_string())
        .context("Failed to persist proxy log path")?;

    let mut supervisor = ProxySupervisor::new(launcher, ports, settings);
    let result = supervisor
        .start(binary, &config, log_file, sink)
        .await
        .context("Failed to start proxy")?;

    sink.set_output(HOST_OUTPUT, &result.host.to_string())
        .context("Failed to set proxy host output")?;
    sink.set_output(PORT_OUTPUT, &result.port.to_string())
        .context("Failed to set proxy port output")?;
    sink.set_output(CA_CERT_OUTPUT, &result.ca_cert)
        .context("Failed to set proxy CA output")?;

    info!(
        "Proxy ready at {}:{} after {} attempt(s)",
        result.host, result.port, result.attempts
    );
    Ok(result)
}
