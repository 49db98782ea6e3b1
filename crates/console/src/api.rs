//! HTTP API: workload listings, application grouping, scaling, health and metrics

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use console_lib::{
    grouper::require_namespace,
    health::{components, ComponentStatus},
    ApplicationGrouper, ConsoleError, ConsoleMetrics, HealthRegistry, ScaleOrchestrator,
    ScaleRequestBody, ScaleStatus, StructuredLogger, WorkloadKind, WorkloadReader,
    DEFAULT_NAMESPACE,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<dyn WorkloadReader>,
    pub health_registry: HealthRegistry,
    pub metrics: ConsoleMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        reader: Arc<dyn WorkloadReader>,
        health_registry: HealthRegistry,
        metrics: ConsoleMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            reader,
            health_registry,
            metrics,
            logger,
        }
    }

    /// Record the outcome of a cluster-backed call in health and metrics
    async fn track<T>(&self, result: Result<T, ConsoleError>) -> Result<T, ApiError> {
        self.health_registry.observe_cluster(&result).await;
        result.map_err(|err| {
            self.metrics.inc_error(err.kind());
            warn!(kind = %err.kind(), error = %err.message(), "request failed");
            ApiError(err)
        })
    }
}

/// Error response carrying the machine-readable kind and the underlying message
#[derive(Debug)]
pub struct ApiError(pub ConsoleError);

impl From<ConsoleError> for ApiError {
    fn from(err: ConsoleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ConsoleError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ConsoleError::NotFound(_) => StatusCode::NOT_FOUND,
            ConsoleError::ClusterUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.message(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

impl NamespaceQuery {
    /// Namespace for plain listings; blank or absent means `default`
    fn or_default(&self) -> &str {
        self.namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn list_namespaces(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let namespaces = state.track(state.reader.list_namespaces().await).await?;
    Ok(Json(namespaces).into_response())
}

async fn list_pods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Response, ApiError> {
    let pods = state
        .track(state.reader.list_pods(query.or_default()).await)
        .await?;
    Ok(Json(pods).into_response())
}

async fn list_kind(
    state: &AppState,
    query: &NamespaceQuery,
    kind: WorkloadKind,
) -> Result<Response, ApiError> {
    let workloads = state
        .track(state.reader.list_workloads(query.or_default(), kind).await)
        .await?;
    Ok(Json(workloads).into_response())
}

async fn list_deployments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Response, ApiError> {
    list_kind(&state, &query, WorkloadKind::Deployment).await
}

async fn list_statefulsets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Response, ApiError> {
    list_kind(&state, &query, WorkloadKind::StatefulSet).await
}

async fn list_apps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Response, ApiError> {
    let namespace = require_namespace(query.namespace.as_deref().unwrap_or_default())?;

    let started = Instant::now();
    let grouper = ApplicationGrouper::new(state.reader.clone());
    let groups = state
        .track(grouper.group_by_application(namespace).await)
        .await?;
    state
        .metrics
        .observe_discovery_latency(started.elapsed().as_secs_f64());
    state.metrics.set_applications_discovered(groups.len() as i64);

    Ok(Json(groups).into_response())
}

async fn scale(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScaleRequestBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        ApiError(ConsoleError::invalid(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    })?;
    info!(body = ?body, "scale requested");

    let orchestrator = ScaleOrchestrator::new(state.reader.clone(), state.logger.clone());
    let result = state.track(orchestrator.scale_body(&body).await).await?;
    state.health_registry.observe_scale(&result).await;

    let status_code = match result.status {
        ScaleStatus::Succeeded => StatusCode::OK,
        ScaleStatus::PartialFailure => StatusCode::MULTI_STATUS,
        ScaleStatus::Failed => StatusCode::BAD_GATEWAY,
    };
    Ok((status_code, Json(result)).into_response())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/health", get(healthz))
        .route("/api/namespaces", get(list_namespaces))
        .route("/api/pods", get(list_pods))
        .route("/api/deployments", get(list_deployments))
        .route("/api/statefulsets", get(list_statefulsets))
        .route("/api/apps", get(list_apps))
        .route("/api/scale", post(scale))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Register the components this server reports on
pub async fn register_components(health_registry: &HealthRegistry) {
    health_registry.register(components::CLUSTER).await;
    health_registry.register(components::API).await;
}

/// Verify the cluster answers before reporting ready
///
/// A failure marks the cluster component unhealthy; the server keeps
/// running and recovers on the first successful cluster call.
pub async fn check_cluster(state: &AppState) {
    let result = state.reader.list_namespaces().await;
    if let Err(err) = &result {
        warn!(kind = %err.kind(), error = %err.message(), "cluster connectivity check failed");
    }
    state.health_registry.observe_startup(&result).await;
}
