// ABOUTME: Lifecycle store persisted to a JSON state file.
// ABOUTME: Every mutation rewrites the file via a temp file and an atomic rename.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use super::tables::Tables;
use super::{LifecycleStore, RepoError, StorePage, StoreQuery, Transition};
use crate::model::{Event, Job, JobPatch, JobStatus, Store};
use crate::types::{JobId, StoreId, StoreName};

/// Lifecycle store backed by a single JSON document on disk.
///
/// Intended for one process at a time; the file is read once on open and
/// rewritten after each successful mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl FileStore {
    /// Open the state file at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let path = path.into();

        let tables = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Tables::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Tables::default()
        };

        tracing::debug!(path = %path.display(), "opened lifecycle state file");

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Run a mutation and persist the result while still holding the lock.
    ///
    /// The mutation runs on a copy that replaces the live tables only once
    /// it is on disk, so a failed write leaves no trace in memory either.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, RepoError>,
    ) -> Result<T, RepoError> {
        let mut tables = self.tables.lock();
        let mut next = tables.clone();
        let result = f(&mut next)?;
        write_atomically(&self.path, &next)?;
        *tables = next;
        Ok(result)
    }
}

fn write_atomically(path: &Path, tables: &Tables) -> Result<(), RepoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(tables)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl LifecycleStore for FileStore {
    async fn create_store(&self, store: Store, job: Job) -> Result<(), RepoError> {
        self.mutate(|t| t.create_store(store, job))
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
        self.mutate(|t| t.transition_store(id, transition))
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
        self.mutate(|t| t.update_job(id, expected, patch))
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
        self.mutate(|t| {
            t.append_event(event);
            Ok(())
        })
    }

    async fn events_for_store(&self, store_id: &StoreId) -> Result<Vec<Event>, RepoError> {
        Ok(self.tables.lock().events_for_store(store_id))
    }

    async fn ping(&self) -> Result<(), RepoError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if dir.exists() {
            std::fs::metadata(dir)?;
        } else {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
