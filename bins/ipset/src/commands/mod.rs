//! Subcommand implementations.

pub mod element;
pub mod list;
pub mod set;
