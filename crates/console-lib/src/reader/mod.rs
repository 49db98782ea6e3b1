//! Workload reading from the cluster API
//!
//! This module provides the [`WorkloadReader`] capability used by the
//! grouper and the orchestrator, and its kube-backed implementation. Raw API
//! objects are normalized into [`WorkloadRef`] snapshots at this boundary so
//! nothing above it deals with optional or version-dependent shapes.

mod kube_reader;
mod normalize;

pub use kube_reader::KubeWorkloadReader;
pub use normalize::{
    namespace_summary, pod_summary, workload_from_deployment, workload_from_statefulset,
};

use crate::error::Result;
use crate::models::{NamespaceSummary, PodSummary, WorkloadKind, WorkloadRef};
use async_trait::async_trait;
use futures::future::try_join_all;

/// Read and patch access to namespaced workloads
///
/// Implementations surface `NotFound` for missing resources and
/// `ClusterUnavailable` for transport failures, and never retry.
#[async_trait]
pub trait WorkloadReader: Send + Sync {
    /// List every workload of one kind in a namespace
    async fn list_workloads(&self, namespace: &str, kind: WorkloadKind) -> Result<Vec<WorkloadRef>>;

    /// Read a single workload
    async fn read_workload(&self, kind: WorkloadKind, namespace: &str, name: &str)
        -> Result<WorkloadRef>;

    /// Set the replica count with a merge patch touching only `spec.replicas`
    async fn patch_replicas(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<WorkloadRef>;

    /// List pods in a namespace
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>>;

    /// List namespaces visible to the client
    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>>;

    /// List several kinds concurrently
    ///
    /// The result is the concatenation of each kind's list in the order of
    /// `kinds`, independent of which fetch completes first. Any failed fetch
    /// fails the whole call.
    async fn list_workloads_of(
        &self,
        namespace: &str,
        kinds: &[WorkloadKind],
    ) -> Result<Vec<WorkloadRef>> {
        let lists =
            try_join_all(kinds.iter().map(|kind| self.list_workloads(namespace, *kind))).await?;
        Ok(lists.into_iter().flatten().collect())
    }
}
