//! Plain resource listings

use anyhow::Result;
use chrono::Utc;
use tabled::Tabled;

use crate::client::{ApiClient, Namespace, Pod, Workload};
use crate::output::{color_status, format_age, format_replicas, print_json, print_rows, OutputFormat};

#[derive(Tabled)]
struct WorkloadRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ready")]
    ready: String,
    #[tabled(rename = "Application")]
    app: String,
    #[tabled(rename = "Images")]
    images: String,
}

#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Age")]
    age: String,
}

#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Application id as the console would resolve it, for display only
fn app_label(workload: &Workload) -> String {
    ["app.kubernetes.io/instance", "app.kubernetes.io/name", "app"]
        .iter()
        .filter_map(|key| workload.labels.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| "-".to_string())
}

/// List deployments or statefulsets; `resource` is the API path segment
pub async fn list_workloads(
    client: &ApiClient,
    resource: &str,
    namespace: &str,
    format: OutputFormat,
) -> Result<()> {
    let path = format!("api/{}", resource);
    let workloads: Vec<Workload> = client.get(&path, &[("namespace", namespace)]).await?;

    match format {
        OutputFormat::Json => print_json(&workloads)?,
        OutputFormat::Table => {
            let rows: Vec<WorkloadRow> = workloads
                .iter()
                .map(|w| WorkloadRow {
                    name: w.name.clone(),
                    ready: format_replicas(w.ready_replicas, w.desired_replicas),
                    app: app_label(w),
                    images: w.images.join(", "),
                })
                .collect();
            print_rows(rows, &format!("No {} found in namespace {}", resource, namespace));
        }
    }

    Ok(())
}

pub async fn list_pods(client: &ApiClient, namespace: &str, format: OutputFormat) -> Result<()> {
    let pods: Vec<Pod> = client.get("api/pods", &[("namespace", namespace)]).await?;

    match format {
        OutputFormat::Json => print_json(&pods)?,
        OutputFormat::Table => {
            let now = Utc::now();
            let rows: Vec<PodRow> = pods
                .into_iter()
                .map(|p| PodRow {
                    age: format_age(&p.start_time, now),
                    phase: color_status(&p.phase),
                    name: p.name,
                    node: p.node_name,
                    ip: p.pod_ip,
                })
                .collect();
            print_rows(rows, &format!("No pods found in namespace {}", namespace));
        }
    }

    Ok(())
}

pub async fn list_namespaces(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let namespaces: Vec<Namespace> = client.get("api/namespaces", &[]).await?;

    match format {
        OutputFormat::Json => print_json(&namespaces)?,
        OutputFormat::Table => {
            let rows: Vec<NamespaceRow> = namespaces
                .into_iter()
                .map(|ns| NamespaceRow {
                    status: color_status(&ns.status),
                    name: ns.name,
                })
                .collect();
            print_rows(rows, "No namespaces found");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn workload(labels: &[(&str, &str)]) -> Workload {
        Workload {
            kind: "Deployment".into(),
            name: "api".into(),
            namespace: "default".into(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            desired_replicas: 1,
            ready_replicas: 1,
            images: vec![],
        }
    }

    #[test]
    fn test_app_label_prefers_instance() {
        let w = workload(&[("app", "legacy"), ("app.kubernetes.io/instance", "checkout")]);
        assert_eq!(app_label(&w), "checkout");
    }

    #[test]
    fn test_app_label_missing() {
        assert_eq!(app_label(&workload(&[("tier", "web")])), "-");
        assert_eq!(app_label(&workload(&[("app", "")])), "-");
    }
}
