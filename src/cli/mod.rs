//! CLI support for the `playlog-etl` binary

pub mod commands;
pub mod error;
