// ABOUTME: Process-local lifecycle store.
// ABOUTME: Rows live behind a mutex that is held for a single operation at a time.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::tables::Tables;
use super::{LifecycleStore, RepoError, StorePage, StoreQuery, Transition};
use crate::model::{Event, Job, JobPatch, JobStatus, Store};
use crate::types::{JobId, StoreId, StoreName};

/// Lifecycle store that keeps all rows in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LifecycleStore for MemoryStore {
    async fn create_store(&self, store: Store, job: Job) -> Result<(), RepoError> {
        self.tables.lock().create_store(store, job)
    }

    async fn store(&self, id: &StoreId) -> Result<Option<Store>, RepoError> {
        Ok(self.tables.lock().store(id))
    }

    async fn store_by_name(&self, name: &StoreName) -> Result<Option<Store>, RepoError> {
        Ok(self.tables.lock().store_by_name(name))
    }

    async fn transition_store(
        &self,
        id: &StoreId,
        transition: Transition<'_>,
    ) -> Result<Option<Store>, RepoError> {
        self.tables.lock().transition_store(id, transition)
    }

    async fn list_stores(&self, query: &StoreQuery) -> Result<StorePage, RepoError> {
        Ok(self.tables.lock().list_stores(query))
    }

    async fn update_job(
        &self,
        id: &JobId,
        expected: JobStatus,
        patch: JobPatch,
    ) -> Result<bool, RepoError> {
        self.tables.lock().update_job(id, expected, patch)
    }

    async fn latest_job(&self, store_id: &StoreId) -> Result<Option<Job>, RepoError> {
        Ok(self.tables.lock().latest_job(store_id))
    }

    async fn jobs_for_store(&self, store_id: &StoreId) -> Result<Vec<Job>, RepoError> {
        Ok(self.tables.lock().jobs_for_store(store_id))
    }

    async fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, RepoError> {
        Ok(self.tables.lock().jobs_with_status(status))
    }

    async fn append_event(&self, event: Event) -> Result<(), RepoError> {
        self.tables.lock().append_event(event);
        Ok(())
    }

    async fn events_for_store(&self, store_id: &StoreId) -> Result<Vec<Event>, RepoError> {
        Ok(self.tables.lock().events_for_store(store_id))
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
