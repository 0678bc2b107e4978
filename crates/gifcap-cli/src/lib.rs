//! Gifcap CLI Library
//!
//! Command-line front end for the gifcap capture pipeline: records a
//! synthetic animation through a real capture session and prints
//! configuration.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;
pub mod source;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, LogFormatArg, PriorityArg, RecordArgs};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_bytes, ProgressReporter};
pub use source::SyntheticSource;
