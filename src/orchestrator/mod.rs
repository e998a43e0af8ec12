// ABOUTME: Store lifecycle orchestration: create, delete, and read entry points.
// ABOUTME: Accepts work synchronously and runs provisioning/teardown as supervised tasks.

mod context;
mod deprovision;
mod error;
pub mod naming;
mod provision;
mod reconcile;
mod settings;
mod state;
mod supervisor;

pub use context::LifecycleContext;
pub use error::LifecycleError;
pub use provision::{Provisioning, StepResult};
pub use reconcile::ReconcileReport;
pub use settings::{AdmissionPolicy, OrchestratorSettings};
pub use state::{Accepted, Installed, Placement, ProvisionState, Ready, Started};
pub use supervisor::{Admission, TaskOutcome, TaskSupervisor};

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;

use crate::driver::InfraDriver;
use crate::model::{
    Event, Job, JobType, NewStore, Store, StorePatch, StoreStatus,
};
use crate::probe::{Prober, ReadinessCheck};
use crate::repo::{LifecycleStore, StorePage, StoreQuery, Transition};
use crate::types::{JobId, StoreEngine, StoreId, StoreName, StorePlan};

/// Statuses from which a delete is accepted.
const DELETABLE: [StoreStatus; 3] = [StoreStatus::Pending, StoreStatus::Running, StoreStatus::Failed];

/// Caller input for a new store.
#[derive(Debug, Clone)]
pub struct CreateStoreRequest {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub engine: StoreEngine,
    pub plan: StorePlan,
}

impl CreateStoreRequest {
    pub fn new(name: impl Into<String>, engine: StoreEngine) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            engine,
            plan: StorePlan::default(),
        }
    }
}

/// A store together with its most recent job.
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetails {
    #[serde(flatten)]
    pub store: Store,
    pub latest_job: Option<Job>,
}

/// Readiness of the orchestrator's collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub driver: bool,
    pub storage: bool,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.driver && self.storage
    }
}

/// Entry point for store lifecycle operations.
///
/// Cloning is cheap; clones share the same collaborators and task pool.
#[derive(Clone)]
pub struct Orchestrator {
    ctx: Arc<LifecycleContext>,
    supervisor: Arc<TaskSupervisor>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.ctx.settings)
            .field("in_flight", &self.supervisor.in_flight())
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        repo: Arc<dyn LifecycleStore>,
        driver: Arc<dyn InfraDriver>,
        check: Arc<dyn ReadinessCheck>,
        settings: OrchestratorSettings,
    ) -> Self {
        let supervisor = Arc::new(TaskSupervisor::new(settings.max_concurrent));
        let prober = Prober::new(check, settings.probe);
        Self {
            ctx: Arc::new(LifecycleContext {
                repo,
                driver,
                prober,
                settings,
            }),
            supervisor,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.ctx.settings
    }

    /// Accept a new store and start provisioning it in the background.
    ///
    /// Returns as soon as the store (status `pending`) and its provision job
    /// are recorded.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed name, `UnsupportedEngine` for an engine
    /// that cannot be provisioned, `Conflict` for a name in use, and
    /// `AtCapacity` under the reject policy. Nothing is written in any of
    /// these cases.
    pub async fn create(
        &self,
        request: CreateStoreRequest,
        actor: Option<&str>,
    ) -> Result<Store, LifecycleError> {
        let name = StoreName::new(request.name.trim())?;

        if request.engine.profile().is_none() {
            return Err(LifecycleError::UnsupportedEngine(request.engine));
        }

        if self.ctx.repo.store_by_name(&name).await?.is_some() {
            return Err(LifecycleError::Conflict(format!(
                "store with name '{name}' already exists"
            )));
        }

        let admission = self.supervisor.admit(self.ctx.settings.admission)?;

        let now = Utc::now();
        let store = Store::new(
            NewStore {
                name,
                display_name: request.display_name,
                description: request.description,
                engine: request.engine,
                plan: request.plan,
                created_by: actor.map(str::to_string),
            },
            now,
        );
        let job = Job::pending(store.id.clone(), JobType::Provision, now);
        let job_id = job.id.clone();

        self.ctx.repo.create_store(store.clone(), job).await?;
        tracing::info!(
            store_id = %store.id,
            name = %store.name,
            engine = %store.engine,
            job_id = %job_id,
            "store accepted"
        );

        self.spawn_provision(store.clone(), job_id, admission);
        Ok(store)
    }

    /// Accept deletion of a store and tear it down in the background.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown store, `Conflict` while it is provisioning,
    /// already deleting, or deleted, and `AtCapacity` under the reject policy.
    pub async fn delete(&self, id: &StoreId) -> Result<(), LifecycleError> {
        let store = self
            .ctx
            .repo
            .store(id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("store {id}")))?;

        if !DELETABLE.contains(&store.status) {
            return Err(delete_conflict(&store));
        }

        let admission = self.supervisor.admit(self.ctx.settings.admission)?;

        let job = Job::started(store.id.clone(), JobType::Delete, Utc::now());
        let job_id = job.id.clone();
        let transition = Transition::new(
            &DELETABLE,
            StoreStatus::Deleting,
            StorePatch::message("Deleting store..."),
        )
        .with_job(job);

        let Some(store) = self.ctx.repo.transition_store(id, transition).await? else {
            // lost a race with another status change
            let current = self.ctx.repo.store(id).await?;
            return Err(match current {
                Some(current) => delete_conflict(&current),
                None => LifecycleError::NotFound(format!("store {id}")),
            });
        };

        tracing::info!(store_id = %store.id, job_id = %job_id, "store deletion accepted");
        self.spawn_deprovision(store, job_id, admission);
        Ok(())
    }

    fn spawn_provision(&self, store: Store, job_id: JobId, admission: Admission) {
        let ctx = self.ctx.clone();
        let recover_ctx = self.ctx.clone();
        let store_id = store.id.clone();
        let recover_store = store.id.clone();
        let recover_job = job_id.clone();

        self.supervisor.spawn(
            store_id,
            job_id.clone(),
            JobType::Provision,
            admission,
            async move { provision::run(&ctx, store, job_id).await },
            move |err| {
                async move {
                    recover_ctx
                        .record_crash(&recover_store, &recover_job, JobType::Provision, &err)
                        .await;
                }
                .boxed()
            },
        );
    }

    fn spawn_deprovision(&self, store: Store, job_id: JobId, admission: Admission) {
        let ctx = self.ctx.clone();
        let recover_ctx = self.ctx.clone();
        let store_id = store.id.clone();
        let recover_store = store.id.clone();
        let recover_job = job_id.clone();

        self.supervisor.spawn(
            store_id,
            job_id.clone(),
            JobType::Delete,
            admission,
            async move { deprovision::run(&ctx, store, job_id).await },
            move |err| {
                async move {
                    recover_ctx
                        .record_crash(&recover_store, &recover_job, JobType::Delete, &err)
                        .await;
                }
                .boxed()
            },
        );
    }

    /// A store and its latest job, or `None` if the store does not exist.
    pub async fn get_store(&self, id: &StoreId) -> Result<Option<StoreDetails>, LifecycleError> {
        let Some(store) = self.ctx.repo.store(id).await? else {
            return Ok(None);
        };
        let latest_job = self.ctx.repo.latest_job(id).await?;
        Ok(Some(StoreDetails { store, latest_job }))
    }

    /// Non-deleted stores, newest first.
    pub async fn list_stores(&self, query: StoreQuery) -> Result<StorePage, LifecycleError> {
        let query = StoreQuery {
            page: query.page.max(1),
            limit: query.limit.clamp(1, 100),
            ..query
        };
        Ok(self.ctx.repo.list_stores(&query).await?)
    }

    /// Audit events of a store in the order they happened.
    pub async fn store_events(&self, id: &StoreId) -> Result<Vec<Event>, LifecycleError> {
        self.require_store(id).await?;
        Ok(self.ctx.repo.events_for_store(id).await?)
    }

    /// Every job ever run against a store, oldest first.
    pub async fn store_jobs(&self, id: &StoreId) -> Result<Vec<Job>, LifecycleError> {
        self.require_store(id).await?;
        Ok(self.ctx.repo.jobs_for_store(id).await?)
    }

    /// Release status as reported by the driver, `None` if the store was never placed
    /// or the release is gone.
    pub async fn release_status(
        &self,
        id: &StoreId,
    ) -> Result<Option<serde_json::Value>, LifecycleError> {
        let store = self.require_store(id).await?;
        match (&store.release, &store.namespace) {
            (Some(release), Some(namespace)) => {
                Ok(self.ctx.driver.release_status(release, namespace).await?)
            }
            _ => Ok(None),
        }
    }

    /// Driver availability and storage reachability, checked independently.
    pub async fn readiness(&self) -> ReadinessReport {
        let (driver, storage) =
            tokio::join!(self.ctx.driver.available(), self.ctx.repo.ping());
        if let Err(e) = &storage {
            tracing::warn!(error = %e, "lifecycle store is unreachable");
        }
        ReadinessReport {
            driver,
            storage: storage.is_ok(),
        }
    }

    /// Wait for all background tasks and return their outcomes.
    pub async fn wait_idle(&self) -> Vec<TaskOutcome> {
        self.supervisor.wait_idle().await
    }

    /// Background tasks queued or running.
    pub fn in_flight(&self) -> usize {
        self.supervisor.in_flight()
    }

    async fn require_store(&self, id: &StoreId) -> Result<Store, LifecycleError> {
        self.ctx
            .repo
            .store(id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("store {id}")))
    }
}

fn delete_conflict(store: &Store) -> LifecycleError {
    let reason = match store.status {
        StoreStatus::Provisioning => "is still provisioning",
        StoreStatus::Deleting => "is already being deleted",
        StoreStatus::Deleted => "is already deleted",
        _ => "cannot be deleted in its current status",
    };
    LifecycleError::Conflict(format!("store {} {reason}", store.id))
}
