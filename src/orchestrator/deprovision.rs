// ABOUTME: Detached teardown of a store's release and namespace.
// ABOUTME: A release that is already gone counts as torn down.

use chrono::Utc;

use super::context::{Failure, LifecycleContext};
use super::error::LifecycleError;
use crate::driver::UninstallOutcome;
use crate::model::{EventType, JobPatch, JobStatus, JobType, Store, StorePatch, StoreStatus};
use crate::repo::Transition;
use crate::types::JobId;

/// Tear down a store that has been moved to `deleting`.
pub(crate) async fn run(
    ctx: &LifecycleContext,
    store: Store,
    job_id: JobId,
) -> Result<Store, LifecycleError> {
    let result = teardown(ctx, &store, &job_id).await;
    if let Err(err) = &result {
        ctx.record_failure(Failure {
            store_id: &store.id,
            job_id: &job_id,
            kind: JobType::Delete,
            job_status: JobStatus::Running,
            error: err,
        })
        .await;
    }
    result
}

async fn teardown(
    ctx: &LifecycleContext,
    store: &Store,
    job_id: &JobId,
) -> Result<Store, LifecycleError> {
    ctx.emit(&store.id, EventType::DeletionStarted, "Starting deletion")
        .await?;

    if let (Some(namespace), Some(release)) = (&store.namespace, &store.release) {
        tracing::info!(store_id = %store.id, %namespace, %release, "tearing down release");

        match ctx.driver.uninstall(release, namespace).await? {
            UninstallOutcome::Removed => {}
            UninstallOutcome::NotFound => {
                tracing::warn!(store_id = %store.id, %release, "release already gone, continuing teardown");
            }
        }
        ctx.driver.delete_namespace(namespace).await?;
    } else {
        tracing::debug!(store_id = %store.id, "store was never placed, nothing to tear down");
    }

    let now = Utc::now();
    let patch = StorePatch {
        status_message: Some("Store deleted".to_string()),
        deleted_at: Some(now),
        ..Default::default()
    };
    let allowed = [StoreStatus::Deleting];
    let transition = Transition::new(&allowed, StoreStatus::Deleted, patch);

    let deleted = ctx
        .repo
        .transition_store(&store.id, transition)
        .await?
        .ok_or_else(|| {
            LifecycleError::Internal(format!("store {} left deleting during teardown", store.id))
        })?;

    ctx.emit(&deleted.id, EventType::DeletionCompleted, "Store deleted")
        .await?;
    ctx.update_job(job_id, JobStatus::Running, JobPatch::complete(Utc::now()))
        .await?;
    tracing::info!(store_id = %deleted.id, "store deleted");
    Ok(deleted)
}
