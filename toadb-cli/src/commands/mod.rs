//! Subcommand implementations, one module per command.

pub mod device;
pub mod list;
pub mod reset;
pub mod run;
