// ABOUTME: Readiness check that reads a deployment's ready replica count via kubectl.
// ABOUTME: Empty jsonpath output means the field is not populated yet, i.e. zero.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::{ProbeError, ReadinessCheck};
use crate::process::run_command;

/// Reads `.status.readyReplicas` of a deployment.
#[derive(Debug, Clone)]
pub struct KubectlReadiness {
    binary: PathBuf,
    timeout: Duration,
}

impl KubectlReadiness {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

pub(crate) fn parse_ready_replicas(stdout: &str) -> Result<u32, ProbeError> {
    let trimmed = stdout.trim().trim_matches('\'');
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| ProbeError::Check(format!("unexpected readyReplicas value: {trimmed}")))
}

#[async_trait]
impl ReadinessCheck for KubectlReadiness {
    async fn ready_replicas(&self, namespace: &str, workload: &str) -> Result<u32, ProbeError> {
        let args = vec![
            "get".to_string(),
            "deployment".to_string(),
            workload.to_string(),
            "-n".to_string(),
            namespace.to_string(),
            "-o".to_string(),
            "jsonpath={.status.readyReplicas}".to_string(),
        ];
        let output = run_command(&self.binary, &args, self.timeout).await?;

        if !output.success {
            return Err(ProbeError::Check(output.diagnostic().to_string()));
        }

        parse_ready_replicas(&output.stdout)
    }
}
