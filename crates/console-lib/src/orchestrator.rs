//! Replica scaling of single workloads and whole applications
//!
//! Application-mode scaling is best-effort per target: workloads are
//! patched one after another in discovery order, a failed patch is recorded
//! on its outcome and the remaining targets are still patched. Nothing is
//! rolled back. Discovery reads, by contrast, abort the request on failure.

use crate::error::{ConsoleError, Result};
use crate::grouper::{require_namespace, ApplicationGrouper};
use crate::models::{
    ScaleMode, ScaleOutcome, ScaleRequest, ScaleRequestBody, ScaleResult, ScaleStatus,
    ScaleTarget, WorkloadKind,
};
use crate::observability::{ConsoleMetrics, StructuredLogger};
use crate::reader::WorkloadReader;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ScaleOrchestrator {
    reader: Arc<dyn WorkloadReader>,
    grouper: ApplicationGrouper,
    metrics: ConsoleMetrics,
    logger: StructuredLogger,
}

impl ScaleOrchestrator {
    pub fn new(reader: Arc<dyn WorkloadReader>, logger: StructuredLogger) -> Self {
        Self {
            grouper: ApplicationGrouper::new(reader.clone()),
            reader,
            metrics: ConsoleMetrics::new(),
            logger,
        }
    }

    /// Validate a raw request body and scale it
    ///
    /// Validation happens before any cluster call.
    pub async fn scale_body(&self, body: &ScaleRequestBody) -> Result<ScaleResult> {
        let request = body.validate()?;
        self.scale(&request).await
    }

    /// Scale the workloads a request targets
    ///
    /// Fails with `NotFound` when the single resource does not exist or no
    /// workload resolves to the requested application. Per-target patch
    /// failures in application mode are reported in the returned outcomes
    /// with an aggregate [`ScaleStatus`].
    pub async fn scale(&self, request: &ScaleRequest) -> Result<ScaleResult> {
        if request.replicas < 0 {
            return Err(ConsoleError::invalid("replicas must not be negative"));
        }
        let namespace = require_namespace(&request.namespace)?;

        let result = match &request.target {
            ScaleTarget::Resource { kind, name } => {
                self.scale_resource(namespace, *kind, name, request.replicas)
                    .await?
            }
            ScaleTarget::Application { app_id } => {
                self.scale_application(namespace, app_id, request.replicas)
                    .await?
            }
        };

        self.metrics.inc_scale_request(result.mode, result.status);
        self.logger.log_scale_completed(
            result.mode,
            namespace,
            result.replicas,
            result.targets.len(),
            result.failed_targets().count(),
        );
        Ok(result)
    }

    async fn scale_resource(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
        replicas: i32,
    ) -> Result<ScaleResult> {
        // Confirms the resource exists before writing
        let current = self.reader.read_workload(kind, namespace, name).await?;
        debug!(
            %namespace, %kind, %name,
            from = current.desired_replicas, to = replicas,
            "scaling single workload"
        );

        let updated = match self
            .reader
            .patch_replicas(kind, namespace, name, replicas)
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                // Counted in the error metric by whoever handles the Err
                self.record_failure(&ScaleOutcome::failed(&current, &err));
                return Err(err);
            }
        };

        let outcome = ScaleOutcome::applied(&updated);
        self.record_success(&outcome);

        Ok(ScaleResult {
            mode: ScaleMode::Single,
            namespace: namespace.to_string(),
            replicas,
            app_id: None,
            status: ScaleStatus::Succeeded,
            kind: None,
            targets: vec![outcome],
        })
    }

    async fn scale_application(
        &self,
        namespace: &str,
        app_id: &str,
        replicas: i32,
    ) -> Result<ScaleResult> {
        let targets = self.grouper.discover_application(namespace, app_id).await?;
        if targets.is_empty() {
            return Err(ConsoleError::NotFound(format!(
                "no workloads for application \"{}\" in namespace \"{}\"",
                app_id, namespace
            )));
        }
        info!(%namespace, %app_id, replicas, targets = targets.len(), "scaling application");

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in &targets {
            let outcome = match self
                .reader
                .patch_replicas(target.kind, &target.namespace, &target.name, replicas)
                .await
            {
                Ok(updated) => {
                    let outcome = ScaleOutcome::applied(&updated);
                    self.record_success(&outcome);
                    outcome
                }
                Err(err) => {
                    let outcome = ScaleOutcome::failed(target, &err);
                    self.metrics.inc_error(err.kind());
                    self.record_failure(&outcome);
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let status = ScaleStatus::from_outcomes(&outcomes);
        Ok(ScaleResult {
            mode: ScaleMode::Application,
            namespace: namespace.to_string(),
            replicas,
            app_id: Some(app_id.to_string()),
            status,
            kind: status.error_kind(),
            targets: outcomes,
        })
    }

    fn record_success(&self, outcome: &ScaleOutcome) {
        self.metrics.inc_scale_target(outcome.kind, true);
        self.logger.log_target_scaled(
            outcome.kind,
            &outcome.namespace,
            &outcome.name,
            outcome.applied_replicas.unwrap_or_default(),
        );
    }

    fn record_failure(&self, outcome: &ScaleOutcome) {
        self.metrics.inc_scale_target(outcome.kind, false);
        if let Some(failure) = &outcome.error {
            self.logger.log_target_failed(
                outcome.kind,
                &outcome.namespace,
                &outcome.name,
                failure.kind,
                &failure.message,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{workload, FakeWorkloadReader};
    use serde_json::json;

    const INSTANCE: &str = "app.kubernetes.io/instance";

    fn orchestrator(reader: Arc<FakeWorkloadReader>) -> ScaleOrchestrator {
        ScaleOrchestrator::new(reader, StructuredLogger::new("test"))
    }

    fn checkout_reader() -> Arc<FakeWorkloadReader> {
        Arc::new(FakeWorkloadReader::with_workloads(vec![
            workload(WorkloadKind::Deployment, "default", "checkout-api", &[(INSTANCE, "checkout")], 1),
            workload(WorkloadKind::StatefulSet, "default", "checkout-db", &[(INSTANCE, "checkout")], 1),
            workload(WorkloadKind::Deployment, "default", "checkout-worker", &[(INSTANCE, "checkout")], 1),
            workload(WorkloadKind::Deployment, "default", "unlabeled", &[], 1),
        ]))
    }

    #[tokio::test]
    async fn test_single_resource_scale() {
        let reader = checkout_reader();
        let result = orchestrator(reader.clone())
            .scale(&ScaleRequest::resource("default", WorkloadKind::Deployment, "unlabeled", 4))
            .await
            .unwrap();

        assert_eq!(result.mode, ScaleMode::Single);
        assert_eq!(result.status, ScaleStatus::Succeeded);
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].applied_replicas, Some(4));
        assert_eq!(reader.read_calls(), 1);
        assert_eq!(reader.patch_calls(), 1);
        assert_eq!(
            reader
                .get(WorkloadKind::Deployment, "default", "unlabeled")
                .unwrap()
                .desired_replicas,
            4
        );
    }

    #[tokio::test]
    async fn test_scale_to_current_count_is_idempotent() {
        let reader = checkout_reader();
        let orch = orchestrator(reader.clone());
        let request = ScaleRequest::resource("default", WorkloadKind::StatefulSet, "checkout-db", 1);

        for _ in 0..2 {
            let result = orch.scale(&request).await.unwrap();
            assert_eq!(result.status, ScaleStatus::Succeeded);
            assert_eq!(result.targets[0].applied_replicas, Some(1));
        }
    }

    #[tokio::test]
    async fn test_single_resource_not_found_skips_patch() {
        let reader = checkout_reader();
        let err = orchestrator(reader.clone())
            .scale(&ScaleRequest::resource("default", WorkloadKind::StatefulSet, "missing", 2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(reader.patch_calls(), 0);
    }

    #[tokio::test]
    async fn test_single_resource_patch_failure_propagates() {
        let reader = checkout_reader();
        reader.fail_patch(
            "checkout-api",
            ConsoleError::ClusterUnavailable("request timed out".into()),
        );
        let err = orchestrator(reader)
            .scale(&ScaleRequest::resource("default", WorkloadKind::Deployment, "checkout-api", 2))
            .await
            .unwrap_err();
        assert_eq!(err, ConsoleError::ClusterUnavailable("request timed out".into()));
    }

    #[tokio::test]
    async fn test_application_scale_in_discovery_order() {
        let reader = checkout_reader();
        let result = orchestrator(reader.clone())
            .scale(&ScaleRequest::application("default", "checkout", 3))
            .await
            .unwrap();

        assert_eq!(result.mode, ScaleMode::Application);
        assert_eq!(result.app_id.as_deref(), Some("checkout"));
        assert_eq!(result.status, ScaleStatus::Succeeded);
        let names: Vec<_> = result.targets.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["checkout-api", "checkout-worker", "checkout-db"]);
        assert_eq!(reader.patched(), names);
        assert!(result.targets.iter().all(|o| o.applied_replicas == Some(3)));
        assert_eq!(
            reader
                .get(WorkloadKind::Deployment, "default", "unlabeled")
                .unwrap()
                .desired_replicas,
            1
        );
    }

    #[tokio::test]
    async fn test_application_partial_failure_continues() {
        let reader = checkout_reader();
        reader.fail_patch(
            "checkout-worker",
            ConsoleError::ClusterUnavailable("connection reset by peer".into()),
        );

        let result = orchestrator(reader.clone())
            .scale(&ScaleRequest::application("default", "checkout", 3))
            .await
            .unwrap();

        assert_eq!(result.status, ScaleStatus::PartialFailure);
        assert_eq!(result.kind, Some(ErrorKind::PartialFailure));
        assert_eq!(result.targets.len(), 3);
        assert_eq!(reader.patch_calls(), 3);

        let first = &result.targets[0];
        let second = &result.targets[1];
        let third = &result.targets[2];
        assert_eq!(first.applied_replicas, Some(3));
        assert_eq!(third.applied_replicas, Some(3));
        assert_eq!(second.name, "checkout-worker");
        assert_eq!(second.applied_replicas, None);
        let failure = second.error.as_ref().unwrap();
        assert_eq!(failure.kind, ErrorKind::ClusterUnavailable);
        assert_eq!(failure.message, "connection reset by peer");

        // No rollback of the targets patched before the failure
        assert_eq!(
            reader
                .get(WorkloadKind::Deployment, "default", "checkout-api")
                .unwrap()
                .desired_replicas,
            3
        );
    }

    #[tokio::test]
    async fn test_application_all_targets_failed() {
        let reader = checkout_reader();
        for name in ["checkout-api", "checkout-worker", "checkout-db"] {
            reader.fail_patch(name, ConsoleError::ClusterUnavailable("forbidden".into()));
        }
        let result = orchestrator(reader)
            .scale(&ScaleRequest::application("default", "checkout", 0))
            .await
            .unwrap();
        assert_eq!(result.status, ScaleStatus::Failed);
        assert_eq!(result.kind, None);
        assert_eq!(result.failed_targets().count(), 3);
    }

    #[tokio::test]
    async fn test_single_patch_failure_not_counted_by_orchestrator() {
        // The returned Err is counted once by the caller; NotFound is not
        // produced by any other orchestrator path in these tests
        let reader = checkout_reader();
        reader.fail_patch(
            "checkout-db",
            ConsoleError::NotFound("statefulsets.apps \"checkout-db\" not found".into()),
        );
        let metrics = ConsoleMetrics::new();
        let before = metrics.errors_recorded(ErrorKind::NotFound);

        let err = orchestrator(reader)
            .scale(&ScaleRequest::resource("default", WorkloadKind::StatefulSet, "checkout-db", 2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(metrics.errors_recorded(ErrorKind::NotFound), before);
    }

    #[tokio::test]
    async fn test_unknown_application_is_not_found() {
        let reader = checkout_reader();
        let err = orchestrator(reader.clone())
            .scale(&ScaleRequest::application("default", "nonexistent", 1))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().contains("nonexistent"));
        assert_eq!(reader.patch_calls(), 0);
    }

    #[tokio::test]
    async fn test_discovery_failure_aborts_before_patching() {
        let reader = checkout_reader();
        reader.fail_list(
            WorkloadKind::Deployment,
            ConsoleError::ClusterUnavailable("dial tcp: i/o timeout".into()),
        );
        let err = orchestrator(reader.clone())
            .scale(&ScaleRequest::application("default", "checkout", 2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ClusterUnavailable);
        assert_eq!(reader.patch_calls(), 0);
    }

    #[tokio::test]
    async fn test_negative_replicas_rejected_without_cluster_calls() {
        let reader = checkout_reader();
        let orch = orchestrator(reader.clone());

        let body: ScaleRequestBody =
            serde_json::from_value(json!({"namespace": "default", "appName": "checkout", "replicas": -1}))
                .unwrap();
        let err = orch.scale_body(&body).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = orch
            .scale(&ScaleRequest::resource("default", WorkloadKind::Deployment, "checkout-api", -1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(reader.total_calls(), 0);
    }
}
