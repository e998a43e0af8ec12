// ABOUTME: Job record tracking one provision or delete operation.
// ABOUTME: Progress only moves forward; patches are applied under a status guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{JobId, StoreId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Provision,
    Delete,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobType::Provision => "provision",
            JobType::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        })
    }
}

/// One lifecycle operation attempted against a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub store_id: StoreId,
    pub job_type: JobType,
    pub status: JobStatus,
    /// 0-100, informational only.
    pub progress: u8,
    pub current_step: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A job waiting for its task to start.
    pub fn pending(store_id: StoreId, job_type: JobType, now: DateTime<Utc>) -> Self {
        Job {
            id: JobId::generate(),
            store_id,
            job_type,
            status: JobStatus::Pending,
            progress: 0,
            current_step: None,
            error: None,
            error_code: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A job that counts as running from the moment it is recorded.
    pub fn started(store_id: StoreId, job_type: JobType, now: DateTime<Utc>) -> Self {
        Job {
            status: JobStatus::Running,
            started_at: Some(now),
            ..Job::pending(store_id, job_type, now)
        }
    }
}

/// Field updates for a job. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub current_step: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    /// Mark a pending job as running at the given step.
    pub fn start(step: &str, progress: u8, now: DateTime<Utc>) -> Self {
        JobPatch {
            status: Some(JobStatus::Running),
            progress: Some(progress),
            current_step: Some(step.to_string()),
            started_at: Some(now),
            ..Default::default()
        }
    }

    pub fn step(step: &str, progress: u8) -> Self {
        JobPatch {
            progress: Some(progress),
            current_step: Some(step.to_string()),
            ..Default::default()
        }
    }

    pub fn complete(now: DateTime<Utc>) -> Self {
        JobPatch {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            completed_at: Some(now),
            ..Default::default()
        }
    }

    pub fn fail(error: impl Into<String>, code: &str, now: DateTime<Utc>) -> Self {
        JobPatch {
            status: Some(JobStatus::Failed),
            error: Some(error.into()),
            error_code: Some(code.to_string()),
            completed_at: Some(now),
            ..Default::default()
        }
    }

    pub fn apply(self, job: &mut Job, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(progress) = self.progress {
            job.progress = progress.min(100).max(job.progress);
        }
        if let Some(step) = self.current_step {
            job.current_step = Some(step);
        }
        if let Some(error) = self.error {
            job.error = Some(error);
        }
        if let Some(code) = self.error_code {
            job.error_code = Some(code);
        }
        if let Some(at) = self.started_at {
            job.started_at = Some(at);
        }
        if let Some(at) = self.completed_at {
            job.completed_at = Some(at);
        }
        job.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::pending(StoreId::generate(), JobType::Provision, Utc::now())
    }

    #[test]
    fn pending_job_starts_at_zero() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert!(job.started_at.is_none());
    }

    #[test]
    fn started_job_is_running() {
        let job = Job::started(StoreId::generate(), JobType::Delete, Utc::now());
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
    }

    #[test]
    fn progress_never_moves_backwards() {
        let mut job = job();
        let now = Utc::now();
        JobPatch::step("Waiting for readiness", 50).apply(&mut job, now);
        JobPatch::step("Creating release", 10).apply(&mut job, now);
        assert_eq!(job.progress, 50);
        assert_eq!(job.current_step.as_deref(), Some("Creating release"));
    }

    #[test]
    fn progress_is_capped() {
        let mut job = job();
        JobPatch::step("overshoot", 250).apply(&mut job, Utc::now());
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn fail_records_error_and_code() {
        let mut job = job();
        JobPatch::fail("helm exploded", "DRIVER_FAILURE", Utc::now()).apply(&mut job, Utc::now());
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("helm exploded"));
        assert_eq!(job.error_code.as_deref(), Some("DRIVER_FAILURE"));
    }
}
