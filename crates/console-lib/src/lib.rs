//! Core library for the workload console
//!
//! This crate provides the core functionality for:
//! - Reading Deployments, StatefulSets and Pods from the cluster
//! - Resolving logical application ids from workload labels
//! - Grouping workloads into applications
//! - Scaling single workloads or whole applications
//! - Health checks and observability

pub mod error;
pub mod grouper;
pub mod health;
pub mod labels;
pub mod models;
pub mod observability;
pub mod orchestrator;
pub mod reader;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{ConsoleError, ErrorKind, Result};
pub use grouper::ApplicationGrouper;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use labels::resolve_app_id;
pub use models::*;
pub use observability::{ConsoleMetrics, StructuredLogger};
pub use orchestrator::ScaleOrchestrator;
pub use reader::{KubeWorkloadReader, WorkloadReader};
