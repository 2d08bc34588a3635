//! Subcommand implementations.

pub mod config;
pub mod output;
pub mod resolve;
pub mod sample;
