//! Step outputs and persisted state.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::error::ActionsError;

/// Environment variable naming the step output file.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Environment variable naming the step state file.
pub const STATE_FILE_ENV: &str = "GITHUB_STATE";

/// Destination for step outputs and persisted state.
pub trait StateSink {
    /// Publish an output for later steps.
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), ActionsError>;

    /// Persist a value for this action's post step.
    fn save_state(&mut self, name: &str, value: &str) -> Result<(), ActionsError>;
}

/// Sink writing the runner's file-command format.
///
/// When a file variable is unset (running outside a runner), entries are
/// printed to stdout in the same format instead.
#[derive(Debug, Clone, Default)]
pub struct FileCommandSink {
    output_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
}

impl FileCommandSink {
    /// Create a sink from `GITHUB_OUTPUT` and `GITHUB_STATE`.
    pub fn from_env() -> Self {
        let path_from = |key: &str| {
            std::env::var_os(key)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        Self {
            output_path: path_from(OUTPUT_FILE_ENV),
            state_path: path_from(STATE_FILE_ENV),
        }
    }

    /// Create a sink with explicit file paths.
    pub fn with_paths(output_path: Option<PathBuf>, state_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            state_path,
        }
    }
}

impl StateSink for FileCommandSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), ActionsError> {
        write_file_command(self.output_path.as_deref(), name, value)
    }

    fn save_state(&mut self, name: &str, value: &str) -> Result<(), ActionsError> {
        write_file_command(self.state_path.as_deref(), name, value)
    }
}

/// Append `name<<delimiter\nvalue\ndelimiter\n` to the command file.
fn write_file_command(path: Option<&Path>, name: &str, value: &str) -> Result<(), ActionsError> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(ActionsError::DelimiterCollision {
            name: name.to_string(),
        });
    }

    let entry = format!("{name}<<{delimiter}\n{value}\n{delimiter}\n");

    let Some(path) = path else {
        print!("{entry}");
        return Ok(());
    };

    let write_err = |source| ActionsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(entry.as_bytes()).map_err(write_err)?;

    debug!("Wrote '{}' to {:?}", name, path);
    Ok(())
}

/// Sink that records everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Outputs keyed by name.
    pub outputs: BTreeMap<String, String>,
    /// Persisted state.
    pub state: BTreeMap<String, String>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateSink for MemorySink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), ActionsError> {
        self.outputs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn save_state(&mut self, name: &str, value: &str) -> Result<(), ActionsError> {
        self.state.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
