//! Glyphh Interface - command line
//!
//! Commands:
//! - build: schema + concepts → `.glyphh` artifact
//! - inspect: artifact summary
//! - search: similarity search over an artifact
//! - intent: classify a phrase with the artifact's intents
//! - predict: beam search over a concept sequence

pub mod cli;

#[cfg(test)]
mod cli_tests;

pub use cli::{run_cli, CliError, OutputFormat};
