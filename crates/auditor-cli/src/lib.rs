//! Auditor CLI library.
//!
//! Command-line front end for the legal audit: stream the report of a local
//! PDF to the terminal and write the CSV next to it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
