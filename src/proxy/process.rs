//! Proxy subprocess spawning.
//!
//! A spawned proxy is launched-and-released: once it survives the settle
//! delay the handle is dropped without killing the process, and a separate
//! teardown step stops it later by pid.

use std::io;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, warn};

use super::command::ProxyCommand;

/// What a process did during the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Still alive when the delay elapsed.
    Running,
    /// Exited within the delay. `None` means it was killed by a signal.
    Exited(Option<i32>),
}

/// Handle to one spawned proxy attempt.
#[allow(async_fn_in_trait)]
pub trait ProxyProcess {
    /// OS process id, if still known.
    fn pid(&self) -> Option<u32>;

    /// Wait up to `delay` for the process to exit.
    ///
    /// Returns as soon as an exit is observed.
    async fn settle(&mut self, delay: Duration) -> Settled;

    /// Give up ownership so the process outlives the launcher.
    fn release(self);
}

/// Spawns proxy processes.
#[allow(async_fn_in_trait)]
pub trait ProcessLauncher {
    /// Handle type for spawned processes.
    type Process: ProxyProcess;

    /// Spawn `command` and start writing `config` to its stdin, closing
    /// stdin once written.
    ///
    /// Returns as soon as the process exists; the write may still be in
    /// flight while the caller settles.
    ///
    /// # Errors
    ///
    /// Returns error only if the process could not be created. Failures
    /// writing stdin are logged; the exit they cause is observed by
    /// [`ProxyProcess::settle`].
    async fn spawn(&mut self, command: &ProxyCommand, config: &[u8]) -> io::Result<Self::Process>;
}

/// Launcher backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    type Process = SpawnedProxy;

    async fn spawn(&mut self, command: &ProxyCommand, config: &[u8]) -> io::Result<SpawnedProxy> {
        debug!("Proxy command: {}", command.to_command_line());

        let mut cmd = Command::from(command.build());
        cmd.kill_on_drop(false);
        let mut child = cmd.spawn()?;

        // The write runs alongside the settle delay. A child that never reads
        // its stdin must not hold the attempt past the delay.
        if let Some(stdin) = child.stdin.take() {
            let config = config.to_vec();
            tokio::spawn(async move {
                match write_config(stdin, &config).await {
                    Ok(()) => debug!("Wrote {} byte configuration to proxy stdin", config.len()),
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("Proxy closed stdin before reading configuration")
                    }
                    Err(e) => warn!("Failed to write proxy configuration: {}", e),
                }
            });
        }

        Ok(SpawnedProxy { child })
    }
}

/// Write the configuration and close the pipe.
///
/// `stdin` is dropped on every path, so the pipe is closed even when the
/// write fails.
async fn write_config(mut stdin: ChildStdin, config: &[u8]) -> io::Result<()> {
    stdin.write_all(config).await?;
    stdin.shutdown().await
}

/// A real proxy child process.
#[derive(Debug)]
pub struct SpawnedProxy {
    child: Child,
}

impl ProxyProcess for SpawnedProxy {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn settle(&mut self, delay: Duration) -> Settled {
        match tokio::time::timeout(delay, self.child.wait()).await {
            Err(_) => Settled::Running,
            Ok(Ok(status)) => Settled::Exited(status.code()),
            Ok(Err(e)) => {
                warn!("Failed to observe proxy exit status: {}", e);
                Settled::Running
            }
        }
    }

    fn release(self) {
        debug!("Releasing proxy process {:?}", self.child.id());
    }
}
