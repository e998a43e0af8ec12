// ABOUTME: Startup reconciliation of jobs left behind by a previous process.
// ABOUTME: Stale running jobs are settled; pending provisions are admitted again.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Orchestrator;
use super::context::{Failure, Settlement};
use super::error::LifecycleError;
use crate::model::{Job, JobPatch, JobStatus, JobType, StoreStatus};
use crate::types::JobId;

/// What a reconciliation pass did, by job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Jobs marked failed.
    pub failed: Vec<JobId>,
    /// Stale jobs whose store had already reached the job's goal.
    pub completed: Vec<JobId>,
    /// Pending provision jobs started again.
    pub resumed: Vec<JobId>,
    /// Jobs left alone: still owned by a live task, or too recent to judge.
    pub skipped: Vec<JobId>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
            && self.completed.is_empty()
            && self.resumed.is_empty()
            && self.skipped.is_empty()
    }
}

impl Orchestrator {
    /// Settle jobs whose task did not survive.
    ///
    /// Running jobs started before `now - stale_job_after` that no task in this
    /// process owns are failed with `INTERNAL_ERROR`, and their store goes to
    /// `failed`. If the store already reached the job's goal (`running` for a
    /// provision, `deleted` for a delete) the job is completed instead.
    /// Pending provision jobs of still-pending stores are admitted again.
    ///
    /// # Errors
    ///
    /// Returns an error if the lifecycle store cannot be read.
    pub async fn reconcile(&self, now: DateTime<Utc>) -> Result<ReconcileReport, LifecycleError> {
        let mut report = ReconcileReport::default();
        let threshold = chrono::Duration::from_std(self.ctx.settings.stale_job_after)
            .unwrap_or(chrono::Duration::MAX);

        for job in self.ctx.repo.jobs_with_status(JobStatus::Running).await? {
            if self.supervisor.is_active(&job.id) {
                report.skipped.push(job.id);
                continue;
            }

            let started = job.started_at.unwrap_or(job.created_at);
            let age = now.signed_duration_since(started);
            if age < threshold {
                tracing::debug!(job_id = %job.id, "running job is recent, leaving it");
                report.skipped.push(job.id);
                continue;
            }

            match self.settle_interrupted(&job).await {
                Settlement::Failed => report.failed.push(job.id),
                Settlement::Completed => report.completed.push(job.id),
            }
        }

        for job in self.ctx.repo.jobs_with_status(JobStatus::Pending).await? {
            if job.job_type != JobType::Provision || self.supervisor.is_active(&job.id) {
                report.skipped.push(job.id);
                continue;
            }

            let store = self.ctx.repo.store(&job.store_id).await?;
            match store {
                Some(store) if store.status == StoreStatus::Pending => {
                    match self.supervisor.admit(self.ctx.settings.admission) {
                        Ok(admission) => {
                            tracing::info!(store_id = %store.id, job_id = %job.id, "resuming pending provisioning");
                            report.resumed.push(job.id.clone());
                            self.spawn_provision(store, job.id, admission);
                        }
                        Err(e) => {
                            tracing::warn!(job_id = %job.id, error = %e, "cannot resume provisioning now");
                            report.skipped.push(job.id);
                        }
                    }
                }
                _ => {
                    let err = LifecycleError::Conflict(
                        "superseded: store left pending before provisioning started".to_string(),
                    );
                    self.ctx
                        .update_job(
                            &job.id,
                            JobStatus::Pending,
                            JobPatch::fail(err.to_string(), err.code(), now),
                        )
                        .await?;
                    report.failed.push(job.id);
                }
            }
        }

        tracing::info!(
            failed = report.failed.len(),
            completed = report.completed.len(),
            resumed = report.resumed.len(),
            skipped = report.skipped.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    async fn settle_interrupted(&self, job: &Job) -> Settlement {
        let err = LifecycleError::Internal(
            "interrupted: orchestrator restarted before the job finished".to_string(),
        );
        self.ctx
            .record_failure(Failure {
                store_id: &job.store_id,
                job_id: &job.id,
                kind: job.job_type,
                job_status: JobStatus::Running,
                error: &err,
            })
            .await
    }
}
