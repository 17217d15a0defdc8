//! CLI subcommands

pub mod announce;
pub mod list;
