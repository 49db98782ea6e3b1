//! Application and health commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, Application, HealthResponse};
use crate::output::{color_status, format_replicas, print_json, print_rows, OutputFormat};

/// Row for applications table
#[derive(Tabled)]
struct ApplicationRow {
    #[tabled(rename = "Application")]
    app_id: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Deployments")]
    deployments: usize,
    #[tabled(rename = "StatefulSets")]
    statefulsets: usize,
    #[tabled(rename = "Resources")]
    resource_count: usize,
}

/// Row for the wide view: one line per member workload
#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Application")]
    app_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ready")]
    ready: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// List applications discovered in a namespace
pub async fn list_apps(
    client: &ApiClient,
    namespace: &str,
    wide: bool,
    format: OutputFormat,
) -> Result<()> {
    let apps: Vec<Application> = client.get("api/apps", &[("namespace", namespace)]).await?;

    match format {
        OutputFormat::Json => print_json(&apps)?,
        OutputFormat::Table if wide => {
            let rows: Vec<MemberRow> = apps
                .iter()
                .flat_map(|app| {
                    app.deployments
                        .iter()
                        .chain(app.statefulsets.iter())
                        .map(move |w| MemberRow {
                            app_id: app.app_id.clone(),
                            kind: w.kind.clone(),
                            name: w.name.clone(),
                            ready: format_replicas(w.ready_replicas, w.desired_replicas),
                        })
                })
                .collect();
            print_rows(rows, &format!("No applications found in namespace {}", namespace));
        }
        OutputFormat::Table => {
            let total = apps.len();
            let rows: Vec<ApplicationRow> = apps
                .into_iter()
                .map(|app| ApplicationRow {
                    deployments: app.deployments.len(),
                    statefulsets: app.statefulsets.len(),
                    resource_count: app.resource_count,
                    app_id: app.app_id,
                    namespace: app.namespace,
                })
                .collect();
            print_rows(rows, &format!("No applications found in namespace {}", namespace));
            if total > 0 {
                println!("\nTotal: {} applications", total);
            }
        }
    }

    Ok(())
}

/// Show console health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthResponse = client.get("api/health", &[]).await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Status: {}\n", color_status(&health.status));
            let rows: Vec<ComponentRow> = health
                .components
                .into_iter()
                .map(|(name, component)| ComponentRow {
                    name,
                    status: color_status(&component.status),
                    message: component.message.unwrap_or_default(),
                })
                .collect();
            print_rows(rows, "No components registered");
        }
    }

    Ok(())
}
