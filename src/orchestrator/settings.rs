// ABOUTME: Runtime settings of the orchestrator and its admission policy.
// ABOUTME: Built from the config file or directly by embedders and tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::probe::ProbePolicy;

/// What happens to new work when every task slot is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// Accept the request; the task waits for a free slot.
    #[default]
    Queue,
    /// Refuse the request with `AtCapacity` before anything is written.
    Reject,
}

impl fmt::Display for AdmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdmissionPolicy::Queue => "queue",
            AdmissionPolicy::Reject => "reject",
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub base_domain: String,
    pub max_concurrent: usize,
    pub admission: AdmissionPolicy,
    pub probe: ProbePolicy,
    pub stale_job_after: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            base_domain: "127.0.0.1.nip.io".to_string(),
            max_concurrent: 5,
            admission: AdmissionPolicy::Queue,
            probe: ProbePolicy::default(),
            stale_job_after: Duration::from_secs(15 * 60),
        }
    }
}
