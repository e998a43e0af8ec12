// ABOUTME: Detached provisioning of a store as a chain of typed transitions.
// ABOUTME: Every step is recorded durably before the next one starts.

use chrono::Utc;

use super::context::{Failure, LifecycleContext};
use super::error::LifecycleError;
use super::naming;
use super::state::{Accepted, Installed, Placement, ProvisionState, Ready, Started};
use crate::driver::{InstallRequest, ReleaseValues};
use crate::model::{EventType, JobPatch, JobStatus, JobType, Store, StorePatch, StoreStatus};
use crate::repo::Transition;
use crate::types::JobId;

const STEP_CREATING_RELEASE: &str = "Creating release";
const STEP_WAITING_FOR_READINESS: &str = "Waiting for readiness";

/// Result type for transitions that record a failure on error.
pub type StepResult<T, S> = Result<Provisioning<T>, (Provisioning<S>, LifecycleError)>;

/// A store being provisioned, parameterized by its current state.
#[derive(Debug)]
pub struct Provisioning<S> {
    store: Store,
    job_id: JobId,
    state: S,
}

impl Provisioning<Accepted> {
    pub fn new(store: Store, job_id: JobId) -> Self {
        Provisioning {
            store,
            job_id,
            state: Accepted,
        }
    }
}

impl<S> Provisioning<S> {
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    fn advance<T>(self, state: T) -> Provisioning<T> {
        Provisioning {
            store: self.store,
            job_id: self.job_id,
            state,
        }
    }
}

impl<S: ProvisionState> Provisioning<S> {
    /// Record the failure and hand the error back.
    pub async fn fail(self, ctx: &LifecycleContext, error: LifecycleError) -> LifecycleError {
        ctx.record_failure(Failure {
            store_id: &self.store.id,
            job_id: &self.job_id,
            kind: JobType::Provision,
            job_status: S::JOB_STATUS,
            error: &error,
        })
        .await;
        error
    }
}

// =============================================================================
// Accepted -> Started
// =============================================================================

impl Provisioning<Accepted> {
    /// Move the store from `pending` to `provisioning` and assign its placement.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the store left `pending` before the task was
    /// admitted, `UnsupportedEngine` if the engine has no profile.
    #[must_use = "provisioning state must be used"]
    pub async fn start(self, ctx: &LifecycleContext) -> StepResult<Started, Accepted> {
        let Some(profile) = self.store.engine.profile() else {
            let engine = self.store.engine;
            return Err((self, LifecycleError::UnsupportedEngine(engine)));
        };

        let release = naming::release_name(&self.store.id);
        let placement = Placement {
            namespace: release.clone(),
            release,
            profile,
        };

        let patch = StorePatch {
            status_message: Some("Starting provisioning...".to_string()),
            namespace: Some(placement.namespace.clone()),
            release: Some(placement.release.clone()),
            ..Default::default()
        };
        let allowed = [StoreStatus::Pending];
        let transition = Transition::new(&allowed, StoreStatus::Provisioning, patch);

        let store = match ctx.repo.transition_store(&self.store.id, transition).await {
            Ok(Some(store)) => store,
            Ok(None) => {
                let err = LifecycleError::Conflict(format!(
                    "superseded: store {} left pending before provisioning started",
                    self.store.id
                ));
                return Err((self, err));
            }
            Err(e) => return Err((self, e.into())),
        };

        tracing::info!(
            store_id = %store.id,
            namespace = %placement.namespace,
            release = %placement.release,
            "provisioning started"
        );
        let recorded = async {
            ctx.emit(&store.id, EventType::ProvisioningStarted, "Provisioning started")
                .await?;
            ctx.update_job(
                &self.job_id,
                JobStatus::Pending,
                JobPatch::start(STEP_CREATING_RELEASE, 10, Utc::now()),
            )
            .await
        }
        .await;
        if let Err(e) = recorded {
            return Err((self, e.into()));
        }

        Ok(Provisioning {
            store,
            job_id: self.job_id,
            state: Started(placement),
        })
    }
}

// =============================================================================
// Started -> Installed
// =============================================================================

impl Provisioning<Started> {
    pub fn placement(&self) -> &Placement {
        &self.state.0
    }

    /// Install the store's release through the driver.
    ///
    /// # Errors
    ///
    /// Returns `DriverFailure` carrying the driver's diagnostic output.
    #[must_use = "provisioning state must be used"]
    pub async fn install(self, ctx: &LifecycleContext) -> StepResult<Installed, Started> {
        let placement = &self.state.0;
        let base_domain = &ctx.settings.base_domain;
        let host = naming::storefront_host(&self.store.name, &self.store.id, base_domain);

        let request = InstallRequest {
            release: placement.release.clone(),
            namespace: placement.namespace.clone(),
            chart: placement.profile.chart.to_string(),
            values: ReleaseValues::for_store(&self.store, &host, base_domain),
        };

        let installed = match ctx.driver.install(&request).await {
            Ok(installed) => installed,
            Err(e) => return Err((self, e.into())),
        };

        tracing::info!(store_id = %self.store.id, release = %placement.release, "release installed");
        tracing::debug!(store_id = %self.store.id, output = %installed.output.trim(), "install output");

        let recorded = ctx
            .update_job(
                &self.job_id,
                JobStatus::Running,
                JobPatch::step(STEP_WAITING_FOR_READINESS, 50),
            )
            .await;
        if let Err(e) = recorded {
            return Err((self, e.into()));
        }

        let placement = self.state.0.clone();
        Ok(self.advance(Installed(placement)))
    }
}

// =============================================================================
// Installed -> Ready
// =============================================================================

impl Provisioning<Installed> {
    /// Poll the store's workload until it reports a ready replica.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` once the probe budget is exhausted.
    #[must_use = "provisioning state must be used"]
    pub async fn await_ready(self, ctx: &LifecycleContext) -> StepResult<Ready, Installed> {
        let placement = &self.state.0;
        let workload = placement.profile.workload_name(&self.store.name);

        if let Err(e) = ctx.prober.wait_ready(&placement.namespace, &workload).await {
            return Err((self, e.into()));
        }

        let placement = self.state.0.clone();
        Ok(self.advance(Ready(placement)))
    }
}

// =============================================================================
// Ready -> running Store
// =============================================================================

impl Provisioning<Ready> {
    /// Publish URLs and the credential reference, and mark the store running.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the store left `provisioning` underneath the task,
    /// or if the completion could not be recorded.
    pub async fn finish(self, ctx: &LifecycleContext) -> Result<Store, (Self, LifecycleError)> {
        let profile = self.state.0.profile;
        let host =
            naming::storefront_host(&self.store.name, &self.store.id, &ctx.settings.base_domain);

        let patch = StorePatch {
            status_message: Some("Store is running".to_string()),
            url: Some(naming::storefront_url(&host)),
            admin_url: Some(naming::admin_url(&host, &profile)),
            admin_username: Some(profile.admin_username.to_string()),
            admin_password_secret: Some(profile.credentials_secret(&self.store.name)),
            ..Default::default()
        };
        let allowed = [StoreStatus::Provisioning];
        let transition = Transition::new(&allowed, StoreStatus::Running, patch);

        let store = match ctx.repo.transition_store(&self.store.id, transition).await {
            Ok(Some(store)) => store,
            Ok(None) => {
                let err = LifecycleError::Internal(format!(
                    "store {} left provisioning while the release was being installed",
                    self.store.id
                ));
                return Err((self, err));
            }
            Err(e) => return Err((self, e.into())),
        };

        // The store is running from here on; failing these writes completes the job instead.
        let recorded = async {
            ctx.emit(&store.id, EventType::ProvisioningCompleted, "Store is running")
                .await?;
            ctx.update_job(&self.job_id, JobStatus::Running, JobPatch::complete(Utc::now()))
                .await
        }
        .await;
        if let Err(e) = recorded {
            return Err((self, e.into()));
        }

        tracing::info!(store_id = %store.id, url = ?store.url, "store is running");
        Ok(store)
    }
}

/// Settle a step: pass the next state through, or record the failure.
async fn settle<T, S: ProvisionState>(
    ctx: &LifecycleContext,
    step: StepResult<T, S>,
) -> Result<Provisioning<T>, LifecycleError> {
    match step {
        Ok(next) => Ok(next),
        Err((current, err)) => Err(current.fail(ctx, err).await),
    }
}

/// Drive a freshly accepted store all the way to `running` or `failed`.
pub(crate) async fn run(
    ctx: &LifecycleContext,
    store: Store,
    job_id: JobId,
) -> Result<Store, LifecycleError> {
    let accepted = Provisioning::new(store, job_id);
    let started = settle(ctx, accepted.start(ctx).await).await?;
    let installed = settle(ctx, started.install(ctx).await).await?;
    let ready = settle(ctx, installed.await_ready(ctx).await).await?;

    match ready.finish(ctx).await {
        Ok(store) => Ok(store),
        Err((ready, err)) => Err(ready.fail(ctx, err).await),
    }
}
