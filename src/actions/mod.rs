//! Runner step I/O.
//!
//! The launcher runs as a CI step. It receives its inputs through
//! `INPUT_<NAME>` environment variables and publishes results through the
//! runner's file commands:
//!
//! - **Outputs** (`GITHUB_OUTPUT`): values consumed by later steps
//! - **State** (`GITHUB_STATE`): values handed to this action's own post step,
//!   which sees them again as `STATE_<name>` environment variables
//!
//! Both are reached through the [`StateSink`] trait so the launch pipeline
//! can be exercised against an in-memory sink.

mod commands;
mod error;
mod inputs;
mod outputs;

pub use commands::{error_annotation, escape_data};
pub use error::ActionsError;
pub use inputs::{input_env_key, EnvInputs, InputSource, StaticInputs};
pub use outputs::{FileCommandSink, MemorySink, StateSink, OUTPUT_FILE_ENV, STATE_FILE_ENV};
