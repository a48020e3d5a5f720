//! Subcommand implementations.

pub mod solve;
