//! CLI layer for medagent.
//!
//! Provides the command-line interface using clap, with commands for
//! provisioning the databases, asking questions, and chatting.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
