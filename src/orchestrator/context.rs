// ABOUTME: Shared collaborators handed to every lifecycle task.
// ABOUTME: Also holds the failure bookkeeping common to all failure paths.

use chrono::Utc;
use std::sync::Arc;

use super::error::LifecycleError;
use super::settings::OrchestratorSettings;
use crate::driver::InfraDriver;
use crate::model::{Event, EventType, JobPatch, JobStatus, JobType, StorePatch, StoreStatus};
use crate::probe::Prober;
use crate::repo::{LifecycleStore, RepoError, Transition};
use crate::types::{JobId, StoreId};

/// Handles injected into the orchestrator; owned for the process lifetime.
pub struct LifecycleContext {
    pub(crate) repo: Arc<dyn LifecycleStore>,
    pub(crate) driver: Arc<dyn InfraDriver>,
    pub(crate) prober: Prober,
    pub(crate) settings: OrchestratorSettings,
}

/// Where a failed task stopped.
pub(crate) struct Failure<'a> {
    pub store_id: &'a StoreId,
    pub job_id: &'a JobId,
    pub kind: JobType,
    /// Status the job must still have for the failure to be recorded.
    pub job_status: JobStatus,
    pub error: &'a LifecycleError,
}

/// How failure bookkeeping settled a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    Failed,
    /// The store had already reached the job's goal, so the job was completed.
    Completed,
}

impl LifecycleContext {
    pub(crate) async fn emit(
        &self,
        store_id: &StoreId,
        event_type: EventType,
        message: &str,
    ) -> Result<(), RepoError> {
        let event = Event::new(store_id.clone(), event_type, message, Utc::now());
        self.repo.append_event(event).await
    }

    /// Conditional job update. A job that moved on is logged and skipped.
    pub(crate) async fn update_job(
        &self,
        job_id: &JobId,
        expected: JobStatus,
        patch: JobPatch,
    ) -> Result<bool, RepoError> {
        let applied = self.repo.update_job(job_id, expected, patch).await?;
        if !applied {
            tracing::warn!(job_id = %job_id, expected = %expected, "job was not in the expected status, update skipped");
        }
        Ok(applied)
    }

    /// Record a failure: store to `failed`, then a `*_failed` event, then the job.
    ///
    /// The event is only written when the store transition applied, so a
    /// store that already moved on keeps a consistent history. A store that
    /// already reached the job's goal (`running` or `deleted`) gets its job
    /// completed instead of failed.
    pub(crate) async fn record_failure(&self, failure: Failure<'_>) -> Settlement {
        let now = Utc::now();
        let (from, goal, message, event_type) = match failure.kind {
            JobType::Provision => (
                StoreStatus::Provisioning,
                StoreStatus::Running,
                failure.error.to_string(),
                EventType::ProvisioningFailed,
            ),
            JobType::Delete => (
                StoreStatus::Deleting,
                StoreStatus::Deleted,
                format!("Deletion failed: {}", failure.error),
                EventType::DeletionFailed,
            ),
        };

        tracing::error!(
            store_id = %failure.store_id,
            job_id = %failure.job_id,
            kind = %failure.kind,
            code = failure.error.code(),
            error = %failure.error,
            "lifecycle task failed"
        );

        let allowed = [from];
        let transition = Transition::new(&allowed, StoreStatus::Failed, StorePatch::message(&message));
        let settlement = match self.repo.transition_store(failure.store_id, transition).await {
            Ok(Some(_)) => {
                if let Err(e) = self.emit(failure.store_id, event_type, &message).await {
                    tracing::error!(store_id = %failure.store_id, event = %event_type, error = %e, "failed to record event");
                }
                Settlement::Failed
            }
            Ok(None) => match self.repo.store(failure.store_id).await {
                Ok(Some(store)) if store.status == goal => {
                    tracing::warn!(store_id = %failure.store_id, status = %goal, "store already reached its goal, completing the job");
                    Settlement::Completed
                }
                _ => {
                    tracing::warn!(store_id = %failure.store_id, expected = %from, "store no longer in expected status, leaving it untouched");
                    Settlement::Failed
                }
            },
            Err(e) => {
                tracing::error!(store_id = %failure.store_id, error = %e, "failed to mark store failed");
                Settlement::Failed
            }
        };

        let patch = match settlement {
            Settlement::Completed => JobPatch::complete(now),
            Settlement::Failed => {
                JobPatch::fail(failure.error.to_string(), failure.error.code(), now)
            }
        };
        if let Err(e) = self.update_job(failure.job_id, failure.job_status, patch).await {
            tracing::error!(job_id = %failure.job_id, error = %e, "failed to update job");
        }
        settlement
    }

    /// Failure bookkeeping when the job status at the point of failure is unknown.
    pub(crate) async fn record_crash(
        &self,
        store_id: &StoreId,
        job_id: &JobId,
        kind: JobType,
        error: &LifecycleError,
    ) {
        let job_status = match self.repo.jobs_for_store(store_id).await {
            Ok(jobs) => jobs
                .into_iter()
                .find(|j| &j.id == job_id)
                .map(|j| j.status)
                .unwrap_or(JobStatus::Running),
            Err(_) => JobStatus::Running,
        };

        self.record_failure(Failure {
            store_id,
            job_id,
            kind,
            job_status,
            error,
        })
        .await;
    }
}
