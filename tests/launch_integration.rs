//! End-to-end launches against stand-in proxy scripts.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use proxy_launcher::actions::{MemorySink, StaticInputs};
use proxy_launcher::orchestrator::{self, CA_CERT_OUTPUT, HOST_OUTPUT, LOG_PATH_STATE, PORT_OUTPUT};
use proxy_launcher::proxy::{
    CertificateAuthority, ProxyConfig, ProxySupervisor, RandomPortSelector, SupervisorError,
    SupervisorSettings, TokioLauncher, PID_STATE,
};
use proxy_launcher::teardown;
use serde_json::Value;
use tempfile::TempDir;

// Writing and exec'ing scripts from parallel tests can hit ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn settings() -> SupervisorSettings {
    SupervisorSettings {
        settle_delay: Duration::from_millis(300),
        ..Default::default()
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A proxy that records its arguments and stdin, then stays alive.
fn capturing_proxy(dir: &Path) -> PathBuf {
    let body = format!(
        "echo \"$@\" > {dir}/args\ncat > {dir}/stdin.tmp\nmv {dir}/stdin.tmp {dir}/stdin\nexec sleep 30",
        dir = dir.display()
    );
    write_script(dir, "capture-proxy", &body)
}

fn wait_for_file(path: &Path) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(contents) = fs::read_to_string(path) {
            return contents;
        }
        assert!(Instant::now() < deadline, "{} never appeared", path.display());
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn stop(sink: &MemorySink) {
    if let Some(pid) = sink.state.get(PID_STATE) {
        teardown::terminate(pid.parse().unwrap()).unwrap();
    }
}

#[tokio::test]
async fn test_always_failing_proxy_exhausts_attempts() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let binary = write_script(dir.path(), "failing-proxy", "exit 3");
    let config = ProxyConfig::assemble(Vec::new(), CertificateAuthority::generate().unwrap(), None);
    let mut sink = MemorySink::new();

    let mut supervisor = ProxySupervisor::new(TokioLauncher, RandomPortSelector, settings());
    let err = supervisor
        .start(&binary, &config, &dir.path().join("proxy.log"), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SupervisorError::Exhausted {
            attempts: 5,
            last_exit_code: Some(3)
        }
    ));
    assert!(sink.outputs.is_empty());
}

#[tokio::test]
async fn test_missing_binary_is_spawn_error() {
    let dir = TempDir::new().unwrap();
    let config = ProxyConfig::assemble(Vec::new(), CertificateAuthority::generate().unwrap(), None);
    let mut sink = MemorySink::new();

    let mut supervisor = ProxySupervisor::new(TokioLauncher, RandomPortSelector, settings());
    let err = supervisor
        .start(
            &dir.path().join("no-such-proxy"),
            &config,
            &dir.path().join("proxy.log"),
            &mut sink,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SupervisorError::Spawn { .. }));
    assert!(sink.state.is_empty());
}

#[tokio::test]
async fn test_encoded_credentials_reach_proxy_stdin() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let binary = capturing_proxy(dir.path());
    let log_file = dir.path().join("proxy.log");
    let encoded =
        STANDARD.encode(r#"[{"type":"npm","host":"registry.npmjs.org","token":"abc"}]"#);
    let inputs = StaticInputs::new().with("encoded_credentials", encoded);
    let mut sink = MemorySink::new();

    let result = orchestrator::start_proxy(
        &inputs,
        TokioLauncher,
        RandomPortSelector,
        &binary,
        &log_file,
        settings(),
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(sink.outputs.get(HOST_OUTPUT).map(String::as_str), Some("127.0.0.1"));
    assert_eq!(sink.outputs.get(PORT_OUTPUT).map(String::as_str), Some("49152"));
    assert!(sink.outputs[CA_CERT_OUTPUT].starts_with("-----BEGIN CERTIFICATE-----"));
    assert_eq!(
        sink.state.get(LOG_PATH_STATE),
        Some(&log_file.display().to_string())
    );
    assert_eq!(
        sink.state.get(PID_STATE),
        result.pid.map(|p| p.to_string()).as_ref()
    );

    let stdin: Value = serde_json::from_str(&wait_for_file(&dir.path().join("stdin"))).unwrap();
    assert_eq!(stdin["all_credentials"][0]["type"], "npm");
    assert_eq!(stdin["all_credentials"][0]["token"], "abc");
    assert_eq!(stdin["ca"]["cert"], result.ca_cert.as_str());
    assert!(stdin["ca"]["key"].as_str().unwrap().contains("PRIVATE KEY"));
    assert!(stdin.get("proxy_auth").is_none());

    let args = wait_for_file(&dir.path().join("args"));
    assert_eq!(
        args.trim(),
        format!("-addr 127.0.0.1:49152 -config - -logfile {}", log_file.display())
    );

    stop(&sink);
}

#[tokio::test]
async fn test_proxy_password_enables_proxy_auth() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let binary = capturing_proxy(dir.path());
    let inputs = StaticInputs::new()
        .with("credentials", r#"[{"type":"maven_repository","url":"https://repo.example.com"}]"#)
        .with("proxy_password", "s3cret");
    let mut sink = MemorySink::new();

    orchestrator::start_proxy(
        &inputs,
        TokioLauncher,
        RandomPortSelector,
        &binary,
        &dir.path().join("proxy.log"),
        settings(),
        &mut sink,
    )
    .await
    .unwrap();

    let stdin: Value = serde_json::from_str(&wait_for_file(&dir.path().join("stdin"))).unwrap();
    assert_eq!(stdin["proxy_auth"]["username"], "dependabot");
    assert_eq!(stdin["proxy_auth"]["password"], "s3cret");
    assert_eq!(stdin["all_credentials"][0]["url"], "https://repo.example.com");

    stop(&sink);
}

#[tokio::test]
async fn test_bind_failure_then_success_rotates_port() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    // Fails on the first run only.
    let body = format!(
        "if [ ! -f {dir}/seen ]; then touch {dir}/seen; exit 1; fi\ncat > /dev/null\nexec sleep 30",
        dir = dir.path().display()
    );
    let binary = write_script(dir.path(), "flaky-proxy", &body);
    let config = ProxyConfig::assemble(Vec::new(), CertificateAuthority::generate().unwrap(), None);
    let mut sink = MemorySink::new();

    let mut supervisor = ProxySupervisor::new(TokioLauncher, RandomPortSelector, settings());
    let result = supervisor
        .start(&binary, &config, &dir.path().join("proxy.log"), &mut sink)
        .await
        .unwrap();

    assert_eq!(result.attempts, 2);
    assert!((49152..65535).contains(&result.port));

    stop(&sink);
}
