//! Health tracking for the console server
//!
//! The cluster component follows the outcome of the most recent cluster
//! call, so `/healthz` turns degraded while the API server is unreachable
//! and recovers on the next successful call.

use crate::error::{ConsoleError, ErrorKind};
use crate::models::ScaleResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Operational, but recent calls failed
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across components; no components means healthy
    pub fn compute_status(components: &BTreeMap<String, ComponentHealth>) -> ComponentStatus {
        let mut status = ComponentStatus::Healthy;
        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => status = ComponentStatus::Degraded,
                ComponentStatus::Healthy => {}
            }
        }
        status
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const CLUSTER: &str = "cluster";
    pub const API: &str = "api";
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<BTreeMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.components
            .write()
            .await
            .insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// Track the cluster component from the result of a cluster call
    ///
    /// Only `ClusterUnavailable` degrades it; caller errors say nothing about
    /// cluster reachability.
    pub async fn observe_cluster<T>(&self, result: &Result<T, ConsoleError>) {
        match result {
            Err(ConsoleError::ClusterUnavailable(msg)) => {
                self.set_degraded(components::CLUSTER, msg.clone()).await
            }
            Err(_) => {}
            Ok(_) => {
                let degraded = self
                    .components
                    .read()
                    .await
                    .get(components::CLUSTER)
                    .map(|h| h.status != ComponentStatus::Healthy)
                    .unwrap_or(false);
                if degraded {
                    self.set_healthy(components::CLUSTER).await;
                }
            }
        }
    }

    /// Degrade the cluster component when a scale target failed because the
    /// API server was unreachable, even though the request itself returned
    pub async fn observe_scale(&self, result: &ScaleResult) {
        let unreachable = result
            .failed_targets()
            .filter_map(|o| o.error.as_ref())
            .find(|e| e.kind == ErrorKind::ClusterUnavailable);
        if let Some(failure) = unreachable {
            self.set_degraded(components::CLUSTER, failure.message.clone())
                .await;
        }
    }

    /// Record the startup connectivity check
    ///
    /// Any failure leaves the cluster unhealthy, and the server unready, until
    /// a later cluster call succeeds.
    pub async fn observe_startup<T>(&self, result: &Result<T, ConsoleError>) {
        match result {
            Ok(_) => self.set_healthy(components::CLUSTER).await,
            Err(err) => {
                self.set_unhealthy(components::CLUSTER, err.to_string())
                    .await
            }
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let ready = *self.ready.read().await;
        let health = self.health().await;

        let reason = if !ready {
            Some("Cluster client not yet initialized")
        } else if health.status == ComponentStatus::Unhealthy {
            Some("Critical component unhealthy")
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason: reason.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_cluster_error_degrades_and_recovers() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;
        registry.register(components::API).await;

        let failed: Result<(), ConsoleError> =
            Err(ConsoleError::ClusterUnavailable("connection refused".into()));
        registry.observe_cluster(&failed).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[components::CLUSTER].message.as_deref(),
            Some("connection refused")
        );

        registry.observe_cluster(&Ok::<_, ConsoleError>(())).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_caller_errors_do_not_degrade_cluster() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;

        let not_found: Result<(), ConsoleError> = Err(ConsoleError::NotFound("web".into()));
        registry.observe_cluster(&not_found).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_unhealthy_wins_over_degraded() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;
        registry.register(components::API).await;

        registry.set_degraded(components::API, "slow").await;
        registry.set_unhealthy(components::CLUSTER, "no credentials").await;

        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_failed_scale_target_degrades_cluster() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;

        let result: ScaleResult = serde_json::from_value(serde_json::json!({
            "mode": "application",
            "namespace": "default",
            "replicas": 2,
            "appId": "checkout",
            "status": "partial_failure",
            "kind": "PartialFailure",
            "targets": [
                {"kind": "Deployment", "name": "api", "namespace": "default", "appliedReplicas": 2},
                {"kind": "StatefulSet", "name": "db", "namespace": "default",
                 "error": {"kind": "ClusterUnavailable", "message": "i/o timeout"}}
            ]
        }))
        .unwrap();
        registry.observe_scale(&result).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[components::CLUSTER].message.as_deref(),
            Some("i/o timeout")
        );
    }

    #[tokio::test]
    async fn test_startup_failure_is_unhealthy_until_recovery() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;
        registry.set_ready(true).await;

        let failed: Result<(), ConsoleError> =
            Err(ConsoleError::ClusterUnavailable("Unauthorized".into()));
        registry.observe_startup(&failed).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
        assert!(!registry.readiness().await.ready);

        registry.observe_cluster(&Ok::<_, ConsoleError>(())).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::CLUSTER).await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());

        registry.set_ready(true).await;
        assert!(registry.readiness().await.ready);

        registry.set_unhealthy(components::CLUSTER, "Failed").await;
        assert!(!registry.readiness().await.ready);
    }
}
