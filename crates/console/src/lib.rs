//! Workload console HTTP server
//!
//! Serves workload listings, application grouping and scaling over HTTP for
//! the console front ends.

pub mod api;
pub mod config;
