//! Error taxonomy shared by the reader, grouper and orchestrator

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Malformed or missing request fields. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Named resource or application is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport, auth or API server failure. Callers may retry the whole request.
    #[error("Cluster unavailable: {0}")]
    ClusterUnavailable(String),
}

/// Machine-readable error kind surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    ClusterUnavailable,
    PartialFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ClusterUnavailable => "ClusterUnavailable",
            ErrorKind::PartialFailure => "PartialFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConsoleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ConsoleError::NotFound(_) => ErrorKind::NotFound,
            ConsoleError::ClusterUnavailable(_) => ErrorKind::ClusterUnavailable,
        }
    }

    /// The underlying message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            ConsoleError::InvalidArgument(msg)
            | ConsoleError::NotFound(msg)
            | ConsoleError::ClusterUnavailable(msg) => msg,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ConsoleError::InvalidArgument(msg.into())
    }
}

impl From<kube::Error> for ConsoleError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(resp) if resp.code == 404 => {
                ConsoleError::NotFound(resp.message.clone())
            }
            _ => ConsoleError::ClusterUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: "Test".to_string(),
            code,
        })
    }

    #[test]
    fn test_kube_404_maps_to_not_found() {
        let err: ConsoleError = api_error(404, "deployments.apps \"web\" not found").into();
        assert_eq!(
            err,
            ConsoleError::NotFound("deployments.apps \"web\" not found".to_string())
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_other_kube_errors_map_to_cluster_unavailable() {
        let err: ConsoleError = api_error(403, "forbidden").into();
        assert_eq!(err.kind(), ErrorKind::ClusterUnavailable);
        assert!(err.message().contains("forbidden"));

        let err: ConsoleError = api_error(500, "etcdserver: request timed out").into();
        assert_eq!(err.kind(), ErrorKind::ClusterUnavailable);
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::PartialFailure.to_string(), "PartialFailure");
        assert_eq!(
            ConsoleError::invalid("replicas").to_string(),
            "Invalid argument: replicas"
        );
    }
}
