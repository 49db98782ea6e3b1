//! Scale command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, ScaleRequest, ScaleResult};
use crate::output::{
    color_status, print_error, print_info, print_json, print_rows, print_success, print_warning,
    OutputFormat,
};
use crate::ScaleArgs;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn build_request(namespace: &str, args: ScaleArgs) -> ScaleRequest {
    ScaleRequest {
        namespace: namespace.to_string(),
        replicas: args.replicas,
        name: args.name,
        kind: args.kind,
        app_name: args.app,
    }
}

/// Scale a workload or an application and report every target's outcome
pub async fn scale(
    client: &ApiClient,
    namespace: &str,
    args: ScaleArgs,
    format: OutputFormat,
) -> Result<()> {
    let request = build_request(namespace, args);
    let result = client.scale(&request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_result(&result),
    }

    match exit_error(&result) {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

/// Error to exit with when any target failed; succeeded results exit cleanly
fn exit_error(result: &ScaleResult) -> Option<String> {
    let total = result.targets.len();
    let failed = result.targets.iter().filter(|t| t.error.is_some()).count();
    match result.status.as_str() {
        "succeeded" if failed == 0 => None,
        "partial_failure" => Some(format!("{} of {} targets failed", failed, total)),
        _ => Some(format!("no target was scaled ({} of {} failed)", failed, total)),
    }
}

fn print_result(result: &ScaleResult) {
    let subject = match &result.app_id {
        Some(app) => format!("application {}", app),
        None => "workload".to_string(),
    };
    print_info(&format!(
        "Scaling {} in namespace {} to {} replicas",
        subject, result.namespace, result.replicas
    ));

    let rows: Vec<OutcomeRow> = result
        .targets
        .iter()
        .map(|t| match (&t.applied_replicas, &t.error) {
            (_, Some(err)) => OutcomeRow {
                kind: t.kind.clone(),
                name: t.name.clone(),
                result: color_status("failed"),
                detail: format!("{}: {}", err.kind, err.message),
            },
            (applied, None) => OutcomeRow {
                kind: t.kind.clone(),
                name: t.name.clone(),
                result: color_status("succeeded"),
                detail: applied
                    .map(|n| format!("{} replicas", n))
                    .unwrap_or_default(),
            },
        })
        .collect();
    print_rows(rows, "No targets");

    let failed = result.targets.iter().filter(|t| t.error.is_some()).count();
    match result.status.as_str() {
        "succeeded" => print_success(&format!("Scaled {} target(s)", result.targets.len())),
        "partial_failure" => print_warning(&format!(
            "{} of {} target(s) failed; successful targets were not rolled back",
            failed,
            result.targets.len()
        )),
        _ => print_error(&format!("All {} target(s) failed", failed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ScaleOutcome, TargetFailure};

    fn outcome(name: &str, error: Option<&str>) -> ScaleOutcome {
        ScaleOutcome {
            kind: "Deployment".into(),
            name: name.into(),
            namespace: "default".into(),
            applied_replicas: error.is_none().then_some(3),
            error: error.map(|message| TargetFailure {
                kind: "ClusterUnavailable".into(),
                message: message.into(),
            }),
        }
    }

    fn result(status: &str, targets: Vec<ScaleOutcome>) -> ScaleResult {
        ScaleResult {
            mode: "application".into(),
            namespace: "default".into(),
            replicas: 3,
            app_id: Some("checkout".into()),
            status: status.into(),
            kind: (status == "partial_failure").then(|| "PartialFailure".to_string()),
            targets,
        }
    }

    #[test]
    fn test_exit_error_success() {
        let r = result("succeeded", vec![outcome("api", None), outcome("db", None)]);
        assert_eq!(exit_error(&r), None);
    }

    #[test]
    fn test_exit_error_partial_failure_is_not_success() {
        let r = result(
            "partial_failure",
            vec![
                outcome("api", None),
                outcome("worker", Some("connection reset by peer")),
                outcome("db", None),
            ],
        );
        assert_eq!(exit_error(&r).as_deref(), Some("1 of 3 targets failed"));
    }

    #[test]
    fn test_exit_error_all_failed() {
        let r = result("failed", vec![outcome("api", Some("forbidden"))]);
        let message = exit_error(&r).unwrap();
        assert!(message.starts_with("no target was scaled"), "{}", message);
    }

    #[test]
    fn test_build_request_application_mode() {
        let args = ScaleArgs {
            replicas: 3,
            app: Some("checkout".into()),
            name: None,
            kind: None,
        };

        let request = build_request("shop", args);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["namespace"], "shop");
        assert_eq!(body["replicas"], 3);
        assert_eq!(body["appName"], "checkout");
        assert!(body.get("name").is_none());
        assert!(body.get("kind").is_none());
    }

    #[test]
    fn test_build_request_single_mode() {
        let args = ScaleArgs {
            replicas: 0,
            app: None,
            name: Some("checkout-db".into()),
            kind: Some("sts".into()),
        };

        let body = serde_json::to_value(build_request("default", args)).unwrap();

        assert_eq!(body["name"], "checkout-db");
        assert_eq!(body["kind"], "sts");
        assert_eq!(body["replicas"], 0);
        assert!(body.get("appName").is_none());
    }
}
