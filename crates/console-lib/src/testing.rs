//! In-memory workload reader for tests
//!
//! Holds workloads per namespace, counts every call, and can be told to fail
//! listing a kind or patching a given workload.

use crate::error::{ConsoleError, Result};
use crate::models::{NamespaceSummary, PodSummary, WorkloadKind, WorkloadRef};
use crate::reader::WorkloadReader;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a workload snapshot with the given labels
pub fn workload(
    kind: WorkloadKind,
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    replicas: i32,
) -> WorkloadRef {
    WorkloadRef {
        kind,
        name: name.to_string(),
        namespace: namespace.to_string(),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        desired_replicas: replicas,
        ready_replicas: replicas,
        images: vec![format!("registry.local/{}:latest", name)],
    }
}

#[derive(Default)]
pub struct FakeWorkloadReader {
    workloads: Mutex<Vec<WorkloadRef>>,
    pods: Mutex<Vec<PodSummary>>,
    failing_lists: Mutex<HashMap<WorkloadKind, ConsoleError>>,
    failing_patches: Mutex<HashMap<String, ConsoleError>>,
    failing_namespaces: Mutex<Option<ConsoleError>>,
    list_calls: AtomicUsize,
    read_calls: AtomicUsize,
    patch_calls: AtomicUsize,
    patched: Mutex<Vec<String>>,
}

impl FakeWorkloadReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workloads(workloads: Vec<WorkloadRef>) -> Self {
        let reader = Self::new();
        *reader.workloads.lock().unwrap() = workloads;
        reader
    }

    pub fn add_pod(&self, pod: PodSummary) {
        self.pods.lock().unwrap().push(pod);
    }

    /// Make every list of `kind` fail with `err`
    pub fn fail_list(&self, kind: WorkloadKind, err: ConsoleError) {
        self.failing_lists.lock().unwrap().insert(kind, err);
    }

    /// Make patches of the workload called `name` fail with `err`
    pub fn fail_patch(&self, name: &str, err: ConsoleError) {
        self.failing_patches
            .lock()
            .unwrap()
            .insert(name.to_string(), err);
    }

    /// Make namespace listing fail with `err`
    pub fn fail_namespaces(&self, err: ConsoleError) {
        *self.failing_namespaces.lock().unwrap() = Some(err);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }

    /// Total calls of any kind against the fake cluster
    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.read_calls() + self.patch_calls()
    }

    /// Names passed to `patch_replicas`, in call order
    pub fn patched(&self) -> Vec<String> {
        self.patched.lock().unwrap().clone()
    }

    /// Current snapshot of a stored workload
    pub fn get(&self, kind: WorkloadKind, namespace: &str, name: &str) -> Option<WorkloadRef> {
        self.workloads
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.kind == kind && w.namespace == namespace && w.name == name)
            .cloned()
    }

    fn not_found(kind: WorkloadKind, namespace: &str, name: &str) -> ConsoleError {
        ConsoleError::NotFound(format!("{} {}/{} not found", kind, namespace, name))
    }
}

#[async_trait]
impl WorkloadReader for FakeWorkloadReader {
    async fn list_workloads(&self, namespace: &str, kind: WorkloadKind) -> Result<Vec<WorkloadRef>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failing_lists.lock().unwrap().get(&kind) {
            return Err(err.clone());
        }
        Ok(self
            .workloads
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.kind == kind && w.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn read_workload(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
    ) -> Result<WorkloadRef> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.get(kind, namespace, name)
            .ok_or_else(|| Self::not_found(kind, namespace, name))
    }

    async fn patch_replicas(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Result<WorkloadRef> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        self.patched.lock().unwrap().push(name.to_string());
        if let Some(err) = self.failing_patches.lock().unwrap().get(name) {
            return Err(err.clone());
        }
        let mut workloads = self.workloads.lock().unwrap();
        let workload = workloads
            .iter_mut()
            .find(|w| w.kind == kind && w.namespace == namespace && w.name == name)
            .ok_or_else(|| Self::not_found(kind, namespace, name))?;
        workload.desired_replicas = replicas;
        Ok(workload.clone())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pods
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failing_namespaces.lock().unwrap().as_ref() {
            return Err(err.clone());
        }
        let mut names: Vec<String> = self
            .workloads
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.namespace.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names
            .into_iter()
            .map(|name| NamespaceSummary {
                name,
                status: "Active".to_string(),
            })
            .collect())
    }
}
