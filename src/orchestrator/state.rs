// ABOUTME: Provisioning state marker types for the type state pattern.
// ABOUTME: Later states carry the placement so it exists exactly when it should.

use crate::model::JobStatus;
use crate::types::EngineProfile;

/// Where a store's release lives on the cluster.
#[derive(Debug, Clone)]
pub struct Placement {
    pub namespace: String,
    pub release: String,
    pub profile: EngineProfile,
}

/// Store and job recorded, task admitted.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Accepted;

/// Store is `provisioning`, job running, placement assigned.
/// Available actions: `install()`
#[derive(Debug, Clone)]
pub struct Started(pub Placement);

/// Release installed by the driver.
/// Available actions: `await_ready()`
#[derive(Debug, Clone)]
pub struct Installed(pub Placement);

/// Workload reports a ready replica.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Ready(pub Placement);

/// Job status a state expects when recording a failure.
pub trait ProvisionState {
    const JOB_STATUS: JobStatus;
}

impl ProvisionState for Accepted {
    const JOB_STATUS: JobStatus = JobStatus::Pending;
}

impl ProvisionState for Started {
    const JOB_STATUS: JobStatus = JobStatus::Running;
}

impl ProvisionState for Installed {
    const JOB_STATUS: JobStatus = JobStatus::Running;
}

impl ProvisionState for Ready {
    const JOB_STATUS: JobStatus = JobStatus::Running;
}
