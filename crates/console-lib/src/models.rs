//! Core data models for the workload console

use crate::error::{ConsoleError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Scalable workload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl WorkloadKind {
    /// Discovery order used by grouping and application scaling
    pub const ALL: [WorkloadKind; 2] = [WorkloadKind::Deployment, WorkloadKind::StatefulSet];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deployment" | "deploy" | "deployments" => Ok(WorkloadKind::Deployment),
            "statefulset" | "sts" | "statefulsets" => Ok(WorkloadKind::StatefulSet),
            _ => Err(ConsoleError::InvalidArgument(format!(
                "unsupported workload kind '{}', expected Deployment or StatefulSet",
                s
            ))),
        }
    }
}

/// Normalized snapshot of a Deployment or StatefulSet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub desired_replicas: i32,
    pub ready_replicas: i32,
    pub images: Vec<String>,
}

/// Workloads sharing one resolved application id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationGroup {
    pub app_id: String,
    pub namespace: String,
    pub deployments: Vec<WorkloadRef>,
    pub statefulsets: Vec<WorkloadRef>,
    pub resource_count: usize,
}

impl ApplicationGroup {
    pub fn new(app_id: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            namespace: namespace.into(),
            deployments: Vec::new(),
            statefulsets: Vec::new(),
            resource_count: 0,
        }
    }

    /// Append a member to the sub-sequence of its kind
    pub fn push(&mut self, workload: WorkloadRef) {
        match workload.kind {
            WorkloadKind::Deployment => self.deployments.push(workload),
            WorkloadKind::StatefulSet => self.statefulsets.push(workload),
        }
        self.resource_count += 1;
    }

    /// Members in discovery order: Deployments before StatefulSets
    pub fn members(&self) -> impl Iterator<Item = &WorkloadRef> {
        self.deployments.iter().chain(self.statefulsets.iter())
    }
}

/// Raw scale request as received from a caller
///
/// The target mode is decided by which fields are present; see
/// [`ScaleRequestBody::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "appId", skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

/// What a validated scale request acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleTarget {
    Resource { kind: WorkloadKind, name: String },
    Application { app_id: String },
}

/// Validated scale request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRequest {
    pub namespace: String,
    pub replicas: i32,
    pub target: ScaleTarget,
}

pub const DEFAULT_NAMESPACE: &str = "default";

impl ScaleRequest {
    pub fn resource(
        namespace: impl Into<String>,
        kind: WorkloadKind,
        name: impl Into<String>,
        replicas: i32,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            replicas,
            target: ScaleTarget::Resource {
                kind,
                name: name.into(),
            },
        }
    }

    pub fn application(namespace: impl Into<String>, app_id: impl Into<String>, replicas: i32) -> Self {
        Self {
            namespace: namespace.into(),
            replicas,
            target: ScaleTarget::Application {
                app_id: app_id.into(),
            },
        }
    }

    pub fn mode(&self) -> ScaleMode {
        match self.target {
            ScaleTarget::Resource { .. } => ScaleMode::Single,
            ScaleTarget::Application { .. } => ScaleMode::Application,
        }
    }
}

impl ScaleRequestBody {
    /// Validate field presence and values into a [`ScaleRequest`]
    pub fn validate(&self) -> Result<ScaleRequest, ConsoleError> {
        let replicas = parse_replicas(self.replicas.as_ref())?;

        let namespace = non_blank(self.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string();

        let name = non_blank(self.name.as_deref());
        let kind = non_blank(self.kind.as_deref());
        let app = non_blank(self.app_name.as_deref());

        let target = match (name, kind, app) {
            (Some(name), Some(kind), None) => ScaleTarget::Resource {
                kind: kind.parse()?,
                name: name.to_string(),
            },
            (None, None, Some(app)) => ScaleTarget::Application {
                app_id: app.to_string(),
            },
            (None, None, None) => {
                return Err(ConsoleError::invalid(
                    "provide either (name + kind) or appName along with replicas",
                ))
            }
            (_, _, Some(_)) => {
                return Err(ConsoleError::invalid(
                    "appName cannot be combined with name or kind",
                ))
            }
            (Some(_), None, None) => {
                return Err(ConsoleError::invalid("kind is required when name is given"))
            }
            (None, Some(_), None) => {
                return Err(ConsoleError::invalid("name is required when kind is given"))
            }
        };

        Ok(ScaleRequest {
            namespace,
            replicas,
            target,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_replicas(value: Option<&serde_json::Value>) -> Result<i32, ConsoleError> {
    let invalid = || ConsoleError::invalid("missing or invalid field: replicas");

    let parsed = match value {
        None | Some(serde_json::Value::Null) => return Err(invalid()),
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    if parsed < 0 {
        return Err(ConsoleError::invalid("replicas must not be negative"));
    }
    i32::try_from(parsed).map_err(|_| ConsoleError::invalid("replicas is out of range"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    Single,
    Application,
}

impl ScaleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMode::Single => "single",
            ScaleMode::Application => "application",
        }
    }
}

/// Failure marker attached to a target that could not be scaled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ConsoleError> for TargetFailure {
    fn from(err: &ConsoleError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// Result of scaling one workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOutcome {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TargetFailure>,
}

impl ScaleOutcome {
    pub fn applied(workload: &WorkloadRef) -> Self {
        Self {
            kind: workload.kind,
            name: workload.name.clone(),
            namespace: workload.namespace.clone(),
            applied_replicas: Some(workload.desired_replicas),
            error: None,
        }
    }

    pub fn failed(workload: &WorkloadRef, err: &ConsoleError) -> Self {
        Self {
            kind: workload.kind,
            name: workload.name.clone(),
            namespace: workload.namespace.clone(),
            applied_replicas: None,
            error: Some(err.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate status over every target of a scale request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleStatus {
    Succeeded,
    PartialFailure,
    Failed,
}

impl ScaleStatus {
    pub fn from_outcomes(outcomes: &[ScaleOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed == 0 {
            ScaleStatus::Succeeded
        } else if failed < outcomes.len() {
            ScaleStatus::PartialFailure
        } else {
            ScaleStatus::Failed
        }
    }

    /// Error kind carried by the aggregate result, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ScaleStatus::PartialFailure => Some(ErrorKind::PartialFailure),
            ScaleStatus::Succeeded | ScaleStatus::Failed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleStatus::Succeeded => "succeeded",
            ScaleStatus::PartialFailure => "partial_failure",
            ScaleStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResult {
    pub mode: ScaleMode,
    pub namespace: String,
    pub replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    pub status: ScaleStatus,
    /// `PartialFailure` when some but not all targets failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub targets: Vec<ScaleOutcome>,
}

impl ScaleResult {
    pub fn failed_targets(&self) -> impl Iterator<Item = &ScaleOutcome> {
        self.targets.iter().filter(|o| !o.is_success())
    }
}

/// Container entry of a pod listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub node_name: String,
    #[serde(rename = "podIP")]
    pub pod_ip: String,
    pub start_time: String,
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub name: String,
    pub status: String,
}
