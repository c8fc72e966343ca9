//! Command-line interface
//!
//! Subcommands and the flags that override the configuration file.

pub mod commands;

pub use commands::{Command, ModeArg, NodeArgs, Opt};
