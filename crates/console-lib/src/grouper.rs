//! Grouping of workloads into logical applications

use crate::error::{ConsoleError, Result};
use crate::labels::resolve_app_id;
use crate::models::{ApplicationGroup, WorkloadKind, WorkloadRef};
use crate::reader::WorkloadReader;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Reject empty or whitespace-only namespaces before any cluster read
pub fn require_namespace(namespace: &str) -> Result<&str> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::invalid("missing required parameter: namespace"));
    }
    Ok(trimmed)
}

/// Fold workloads into groups keyed by resolved application id
///
/// Groups keep first-seen order and each kind keeps its discovery order.
/// Workloads without a resolvable id are dropped.
pub fn group_workloads(
    namespace: &str,
    workloads: impl IntoIterator<Item = WorkloadRef>,
) -> Vec<ApplicationGroup> {
    let mut groups: Vec<ApplicationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for workload in workloads {
        let Some(app_id) = resolve_app_id(&workload.labels).map(str::to_string) else {
            continue;
        };
        let slot = *index.entry(app_id.clone()).or_insert_with(|| {
            groups.push(ApplicationGroup::new(app_id, namespace));
            groups.len() - 1
        });
        groups[slot].push(workload);
    }

    groups
}

/// Resolves which workloads of a namespace belong to which application
#[derive(Clone)]
pub struct ApplicationGrouper {
    reader: Arc<dyn WorkloadReader>,
}

impl ApplicationGrouper {
    pub fn new(reader: Arc<dyn WorkloadReader>) -> Self {
        Self { reader }
    }

    /// Fetch Deployments and StatefulSets concurrently, Deployments first in
    /// the merged order. A failed read aborts the whole discovery.
    async fn discover(&self, namespace: &str) -> Result<Vec<WorkloadRef>> {
        self.reader
            .list_workloads_of(namespace, &WorkloadKind::ALL)
            .await
    }

    /// Group every labeled workload of a namespace by application id
    pub async fn group_by_application(&self, namespace: &str) -> Result<Vec<ApplicationGroup>> {
        let namespace = require_namespace(namespace)?;
        let workloads = self.discover(namespace).await?;
        let total = workloads.len();

        let groups = group_workloads(namespace, workloads);
        debug!(
            %namespace,
            workloads = total,
            applications = groups.len(),
            "grouped workloads by application"
        );
        Ok(groups)
    }

    /// Workloads of one application in discovery order
    pub async fn discover_application(
        &self,
        namespace: &str,
        app_id: &str,
    ) -> Result<Vec<WorkloadRef>> {
        let namespace = require_namespace(namespace)?;
        let matched: Vec<WorkloadRef> = self
            .discover(namespace)
            .await?
            .into_iter()
            .filter(|w| resolve_app_id(&w.labels) == Some(app_id))
            .collect();
        debug!(%namespace, %app_id, matched = matched.len(), "discovered application workloads");
        Ok(matched)
    }
}
