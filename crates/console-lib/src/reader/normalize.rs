//! Conversion of raw API objects into console models

use crate::models::{ContainerSummary, NamespaceSummary, PodSummary, WorkloadKind, WorkloadRef};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Pod, PodTemplateSpec};
use kube::ResourceExt;

/// Container images of a pod template in declaration order
fn template_images(template: &PodTemplateSpec) -> Vec<String> {
    template
        .spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .filter_map(|c| c.image.clone())
                .filter(|image| !image.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn workload_from_deployment(d: &Deployment, namespace: &str) -> WorkloadRef {
    let status = d.status.as_ref();
    WorkloadRef {
        kind: WorkloadKind::Deployment,
        name: d.name_any(),
        namespace: d.namespace().unwrap_or_else(|| namespace.to_string()),
        labels: d.labels().clone(),
        desired_replicas: d.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0),
        ready_replicas: status
            .and_then(|s| s.ready_replicas.or(s.available_replicas))
            .unwrap_or(0),
        images: d
            .spec
            .as_ref()
            .map(|s| template_images(&s.template))
            .unwrap_or_default(),
    }
}

pub fn workload_from_statefulset(s: &StatefulSet, namespace: &str) -> WorkloadRef {
    let status = s.status.as_ref();
    WorkloadRef {
        kind: WorkloadKind::StatefulSet,
        name: s.name_any(),
        namespace: s.namespace().unwrap_or_else(|| namespace.to_string()),
        labels: s.labels().clone(),
        desired_replicas: s.spec.as_ref().and_then(|sp| sp.replicas).unwrap_or(0),
        ready_replicas: status
            .and_then(|st| st.ready_replicas.or(st.available_replicas))
            .unwrap_or(0),
        images: s
            .spec
            .as_ref()
            .map(|sp| template_images(&sp.template))
            .unwrap_or_default(),
    }
}

pub fn pod_summary(p: &Pod, namespace: &str) -> PodSummary {
    let status = p.status.as_ref();
    let spec = p.spec.as_ref();
    PodSummary {
        name: p.name_any(),
        namespace: p.namespace().unwrap_or_else(|| namespace.to_string()),
        phase: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        node_name: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        pod_ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
        start_time: status
            .and_then(|s| s.start_time.as_ref())
            .map(|t| t.0.to_rfc3339())
            .unwrap_or_default(),
        containers: spec
            .map(|s| {
                s.containers
                    .iter()
                    .map(|c| ContainerSummary {
                        name: c.name.clone(),
                        image: c.image.clone().unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub fn namespace_summary(ns: &Namespace) -> NamespaceSummary {
    NamespaceSummary {
        name: ns.name_any(),
        status: ns
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
    }
}
