// ABOUTME: Lifecycle error taxonomy surfaced by the orchestrator.
// ABOUTME: Each variant maps to a stable machine code recorded on failed jobs.

use thiserror::Error;

use crate::driver::DriverError;
use crate::probe::ProbeError;
use crate::repo::RepoError;
use crate::types::{StoreEngine, StoreNameError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("engine '{0}' is not supported yet")]
    UnsupportedEngine(StoreEngine),

    #[error("at capacity: {0} lifecycle operations already running")]
    AtCapacity(usize),

    #[error("{0}")]
    DriverFailure(String),

    #[error("{0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LifecycleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::Validation(_) => "VALIDATION_ERROR",
            LifecycleError::Conflict(_) => "CONFLICT",
            LifecycleError::NotFound(_) => "NOT_FOUND",
            LifecycleError::UnsupportedEngine(_) => "UNSUPPORTED_ENGINE",
            LifecycleError::AtCapacity(_) => "AT_CAPACITY",
            LifecycleError::DriverFailure(_) => "DRIVER_FAILURE",
            LifecycleError::Timeout(_) => "TIMEOUT",
            LifecycleError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<RepoError> for LifecycleError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NameTaken(name) => {
                LifecycleError::Conflict(format!("store with name '{name}' already exists"))
            }
            RepoError::StoreNotFound(id) => LifecycleError::NotFound(format!("store {id}")),
            other => LifecycleError::Internal(other.to_string()),
        }
    }
}

impl From<DriverError> for LifecycleError {
    fn from(err: DriverError) -> Self {
        LifecycleError::DriverFailure(err.to_string())
    }
}

impl From<ProbeError> for LifecycleError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Timeout { .. } => LifecycleError::Timeout(err.to_string()),
            other => LifecycleError::Internal(other.to_string()),
        }
    }
}

impl From<StoreNameError> for LifecycleError {
    fn from(err: StoreNameError) -> Self {
        LifecycleError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn name_taken_is_conflict() {
        let err: LifecycleError = RepoError::NameTaken("shop-1".to_string()).into();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn probe_timeout_keeps_timeout_wording() {
        let err: LifecycleError = ProbeError::Timeout {
            workload: "store-shop-1-wordpress".to_string(),
            attempts: 3,
            waited: Duration::from_secs(15),
        }
        .into();
        assert_eq!(err.code(), "TIMEOUT");
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn unsupported_engine_names_the_engine() {
        let err = LifecycleError::UnsupportedEngine(StoreEngine::Medusa);
        assert_eq!(err.to_string(), "engine 'medusa' is not supported yet");
        assert_eq!(err.code(), "UNSUPPORTED_ENGINE");
    }
}
