//! CLI subcommands

pub mod apps;
pub mod scale;
pub mod workloads;
