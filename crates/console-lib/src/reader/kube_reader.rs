//! kube-rs backed workload reader

use super::normalize::{
    namespace_summary, pod_summary, workload_from_deployment, workload_from_statefulset,
};
use super::WorkloadReader;
use crate::error::{ConsoleError, Result};
use crate::models::{NamespaceSummary, PodSummary, WorkloadKind, WorkloadRef};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tracing::debug;

/// Workload reader talking to the Kubernetes API server
#[derive(Clone)]
pub struct KubeWorkloadReader {
    client: Client,
}

impl KubeWorkloadReader {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the in-cluster service account, falling back to
    /// the local kubeconfig
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await.map_err(ConsoleError::from)?;
        Ok(Self::new(client))
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn statefulsets(&self, namespace: &str) -> Api<StatefulSet> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn replicas_patch(replicas: i32) -> serde_json::Value {
    json!({ "spec": { "replicas": replicas } })
}

#[async_trait]
impl WorkloadReader for KubeWorkloadReader {
    async fn list_workloads(&self, namespace: &str, kind: WorkloadKind) -> Result<Vec<WorkloadRef>> {
        let params = ListParams::default();
        let workloads: Vec<WorkloadRef> = match kind {
            WorkloadKind::Deployment => self
                .deployments(namespace)
                .list(&params)
                .await?
                .items
                .iter()
                .map(|d| workload_from_deployment(d, namespace))
                .collect(),
            WorkloadKind::StatefulSet => self
                .statefulsets(namespace)
                .list(&params)
                .await?
                .items
                .iter()
                .map(|s| workload_from_statefulset(s, namespace))
                .collect(),
        };
        debug!(%namespace, %kind, count = workloads.len(), "listed workloads");
        Ok(workloads)
    }

    async fn read_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> Result<WorkloadRef> {
        let workload = match kind {
            WorkloadKind::Deployment => {
                workload_from_deployment(&self.deployments(namespace).get(name).await?, namespace)
            }
            WorkloadKind::StatefulSet => {
                workload_from_statefulset(&self.statefulsets(namespace).get(name).await?, namespace)
            }
        };
        Ok(workload)
    }

    async fn patch_replicas(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<WorkloadRef> {
        let patch = replicas_patch(replicas);
        let params = PatchParams::default();
        let workload = match kind {
            WorkloadKind::Deployment => workload_from_deployment(
                &self
                    .deployments(namespace)
                    .patch(name, &params, &Patch::Merge(&patch))
                    .await?,
                namespace,
            ),
            WorkloadKind::StatefulSet => workload_from_statefulset(
                &self
                    .statefulsets(namespace)
                    .patch(name, &params, &Patch::Merge(&patch))
                    .await?,
                namespace,
            ),
        };
        debug!(%namespace, %kind, %name, replicas, "patched replicas");
        Ok(workload)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await?;
        Ok(pods.items.iter().map(|p| pod_summary(p, namespace)).collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await?;
        Ok(namespaces.items.iter().map(namespace_summary).collect())
    }
}
