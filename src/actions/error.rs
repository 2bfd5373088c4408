//! Runner I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing outputs or state.
#[derive(Debug, Error)]
pub enum ActionsError {
    /// Failed to append to a runner file command.
    #[error("Failed to write runner file {path}: {source}")]
    Write {
        /// File named by `GITHUB_OUTPUT` or `GITHUB_STATE`.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The generated heredoc delimiter appears in the name or value.
    #[error("Value for '{name}' contains the file command delimiter")]
    DelimiterCollision {
        /// Output or state name being written.
        name: String,
    },
}
