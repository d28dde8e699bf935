//! wyqa CLI library
//!
//! Command-line interface for the wyqa verification harness.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    BrowserArgs, CaptureArgs, Cli, ColorArg, Commands, ContractArgs, InspectArgs, RunArgs,
    SchemeArg, DEFAULT_OUTPUT, DEFAULT_URL,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
