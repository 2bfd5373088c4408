//! Proxy command-line construction.
//!
//! The proxy binary takes three flag pairs:
//!
//! ```text
//! <binary> -addr 127.0.0.1:49152 -config - -logfile /tmp/proxy.log
//! ```
//!
//! `-config -` tells it to read its JSON configuration from stdin.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Marker telling the proxy to read its configuration from stdin.
pub const STDIN_CONFIG_MARKER: &str = "-";

/// Builder for one proxy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCommand {
    binary: PathBuf,
    listen: Option<SocketAddr>,
    config_from_stdin: bool,
    log_file: Option<PathBuf>,
}

impl ProxyCommand {
    /// Start a command for `binary`.
    pub fn new(binary: &Path) -> Self {
        Self {
            binary: binary.to_path_buf(),
            listen: None,
            config_from_stdin: false,
            log_file: None,
        }
    }

    /// Address the proxy should bind.
    #[must_use]
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.listen = Some(addr);
        self
    }

    /// Read the configuration from stdin.
    #[must_use]
    pub fn config_from_stdin(mut self) -> Self {
        self.config_from_stdin = true;
        self
    }

    /// File the proxy writes its own log to.
    #[must_use]
    pub fn log_file(mut self, path: &Path) -> Self {
        self.log_file = Some(path.to_path_buf());
        self
    }

    /// Binary being invoked.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Bind address, if set.
    pub fn listen_addr(&self) -> Option<SocketAddr> {
        self.listen
    }

    /// Arguments passed to the binary, in order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(6);
        if let Some(addr) = self.listen {
            args.push("-addr".into());
            args.push(addr.to_string().into());
        }
        if self.config_from_stdin {
            args.push("-config".into());
            args.push(STDIN_CONFIG_MARKER.into());
        }
        if let Some(ref path) = self.log_file {
            args.push("-logfile".into());
            args.push(path.clone().into_os_string());
        }
        args
    }

    /// Build a detached process command.
    ///
    /// The child gets its own process group so signals aimed at the
    /// launcher's group do not reach it. Stdin is piped for the
    /// configuration; stdout and stderr are discarded since the proxy logs to
    /// its log file.
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);
        cmd
    }

    /// Get the command line as a string (for debugging/logging).
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.binary.clone().into_os_string())
            .chain(self.args())
            .map(|arg| {
                let s = arg.to_string_lossy().into_owned();
                if s.contains(' ') || s.contains('"') {
                    format!("'{}'", s.replace('\'', "'\\''"))
                } else {
                    s
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
