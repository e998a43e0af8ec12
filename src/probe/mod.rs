// ABOUTME: Readiness polling for store workloads.
// ABOUTME: Individual poll failures mean "not ready yet"; only an exhausted budget is a timeout.

mod kubectl;

pub use kubectl::KubectlReadiness;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::process::CommandError;

/// Errors from readiness checks.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out waiting for {workload} to become ready after {attempts} attempts ({}s)", waited.as_secs())]
    Timeout {
        workload: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("readiness check could not run: {0}")]
    Command(#[from] CommandError),

    #[error("readiness check failed: {0}")]
    Check(String),
}

/// A single readiness signal of a workload.
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    /// Number of ready replicas of `workload` in `namespace`.
    async fn ready_replicas(&self, namespace: &str, workload: &str) -> Result<u32, ProbeError>;
}

/// Attempt budget for readiness polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
        }
    }
}

/// Polls a [`ReadinessCheck`] at a fixed interval.
#[derive(Clone)]
pub struct Prober {
    check: Arc<dyn ReadinessCheck>,
    policy: ProbePolicy,
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("policy", &self.policy)
            .finish()
    }
}

impl Prober {
    pub fn new(check: Arc<dyn ReadinessCheck>, policy: ProbePolicy) -> Self {
        Self { check, policy }
    }

    /// Wait until `workload` has at least one ready replica.
    ///
    /// Returns the number of attempts it took.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Timeout` once `max_attempts` polls have not seen
    /// a ready replica.
    pub async fn wait_ready(&self, namespace: &str, workload: &str) -> Result<u32, ProbeError> {
        let start = Instant::now();

        for attempt in 1..=self.policy.max_attempts {
            match self.check.ready_replicas(namespace, workload).await {
                Ok(ready) if ready >= 1 => {
                    tracing::info!(namespace, workload, attempt, "workload is ready");
                    return Ok(attempt);
                }
                Ok(_) => {
                    tracing::debug!(namespace, workload, attempt, "workload not ready yet");
                }
                Err(e) => {
                    tracing::debug!(namespace, workload, attempt, error = %e, "readiness poll failed, retrying");
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        Err(ProbeError::Timeout {
            workload: workload.to_string(),
            attempts: self.policy.max_attempts,
            waited: start.elapsed(),
        })
    }
}
