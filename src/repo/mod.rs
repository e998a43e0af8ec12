// ABOUTME: Lifecycle store trait: the persistence contract for stores, jobs, and events.
// ABOUTME: Conditional updates let concurrent tasks race safely on the same rows.

mod file;
mod memory;
mod tables;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Event, Job, JobPatch, JobStatus, Store, StorePatch, StoreStatus};
use crate::types::{JobId, StoreEngine, StoreId, StoreName};

/// Errors from the lifecycle store.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("store with name '{0}' already exists")]
    NameTaken(String),

    #[error("store not found: {0}")]
    StoreNotFound(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("store cannot move from {from} to {to}")]
    InvalidTransition { from: StoreStatus, to: StoreStatus },

    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A guarded status change: applied only if the store's current status is in `from`.
///
/// The change must also be an edge of [`StoreStatus::can_transition_to`];
/// a guard that admits an illegal edge is rejected with `InvalidTransition`.
#[derive(Debug, Clone)]
pub struct Transition<'a> {
    pub from: &'a [StoreStatus],
    pub to: StoreStatus,
    pub patch: StorePatch,
    /// Job row inserted in the same atomic step as the status change.
    pub job: Option<Job>,
}

impl<'a> Transition<'a> {
    pub fn new(from: &'a [StoreStatus], to: StoreStatus, patch: StorePatch) -> Self {
        Transition {
            from,
            to,
            patch,
            job: None,
        }
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }
}

/// Filters and pagination for listing stores. Pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<StoreStatus>,
    pub engine: Option<StoreEngine>,
}

impl Default for StoreQuery {
    fn default() -> Self {
        StoreQuery {
            page: 1,
            limit: 20,
            status: None,
            engine: None,
        }
    }
}

/// One page of non-deleted stores, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct StorePage {
    pub stores: Vec<Store>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// Persistence contract for lifecycle records.
///
/// Every method is a single atomic operation. Implementations hold any
/// internal lock only for the duration of one call.
#[async_trait]
pub trait LifecycleStore: Send + Sync {
    /// Insert a new store together with its first job.
    /// Fails with `NameTaken` if a non-deleted store already uses the name.
    async fn create_store(&self, store: Store, job: Job) -> Result<(), RepoError>;

    async fn store(&self, id: &StoreId) -> Result<Option<Store>, RepoError>;

    /// Find the non-deleted store with the given name.
    async fn store_by_name(&self, name: &StoreName) -> Result<Option<Store>, RepoError>;

    /// Apply a guarded status transition.
    ///
    /// Returns the updated store, or `None` if the current status was not in
    /// `transition.from` (nothing is written in that case). Fails with
    /// `InvalidTransition` if the state machine does not allow the change.
    async fn transition_store(
        &self,
        id: &StoreId,
        transition: Transition<'_>,
    ) -> Result<Option<Store>, RepoError>;

    async fn list_stores(&self, query: &StoreQuery) -> Result<StorePage, RepoError>;

    /// Update a job only if its current status equals `expected`.
    /// Returns whether the update applied.
    async fn update_job(
        &self,
        id: &JobId,
        expected: JobStatus,
        patch: JobPatch,
    ) -> Result<bool, RepoError>;

    /// Most recently created job of a store.
    async fn latest_job(&self, store_id: &StoreId) -> Result<Option<Job>, RepoError>;

    /// All jobs of a store, oldest first.
    async fn jobs_for_store(&self, store_id: &StoreId) -> Result<Vec<Job>, RepoError>;

    async fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, RepoError>;

    async fn append_event(&self, event: Event) -> Result<(), RepoError>;

    /// Events of a store in the order they were recorded.
    async fn events_for_store(&self, store_id: &StoreId) -> Result<Vec<Event>, RepoError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), RepoError>;
}
