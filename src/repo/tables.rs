// ABOUTME: In-process tables shared by the memory and file lifecycle stores.
// ABOUTME: Holds the row logic; callers wrap it in a lock and decide on persistence.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{RepoError, StorePage, StoreQuery, Transition};
use crate::model::{Event, Job, JobPatch, JobStatus, Store};
use crate::types::{JobId, StoreId, StoreName};

/// Rows in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    jobs: Vec<Job>,
    #[serde(default)]
    events: Vec<Event>,
}

impl Tables {
    pub(crate) fn create_store(&mut self, store: Store, job: Job) -> Result<(), RepoError> {
        if self.store_by_name(&store.name).is_some() {
            return Err(RepoError::NameTaken(store.name.to_string()));
        }
        self.stores.push(store);
        self.jobs.push(job);
        Ok(())
    }

    pub(crate) fn store(&self, id: &StoreId) -> Option<Store> {
        self.stores.iter().find(|s| &s.id == id).cloned()
    }

    pub(crate) fn store_by_name(&self, name: &StoreName) -> Option<Store> {
        self.stores
            .iter()
            .find(|s| &s.name == name && !s.is_deleted())
            .cloned()
    }

    pub(crate) fn transition_store(
        &mut self,
        id: &StoreId,
        transition: Transition<'_>,
    ) -> Result<Option<Store>, RepoError> {
        let store = self
            .stores
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| RepoError::StoreNotFound(id.to_string()))?;

        if !transition.from.contains(&store.status) {
            return Ok(None);
        }
        if !store.status.can_transition_to(transition.to) {
            return Err(RepoError::InvalidTransition {
                from: store.status,
                to: transition.to,
            });
        }

        let now = Utc::now();
        store.status = transition.to;
        transition.patch.apply(store, now);
        let updated = store.clone();

        if let Some(job) = transition.job {
            self.jobs.push(job);
        }

        Ok(Some(updated))
    }

    pub(crate) fn list_stores(&self, query: &StoreQuery) -> StorePage {
        let mut matching: Vec<&Store> = self
            .stores
            .iter()
            .rev()
            .filter(|s| !s.is_deleted())
            .filter(|s| query.status.is_none_or(|status| s.status == status))
            .filter(|s| query.engine.is_none_or(|engine| s.engine == engine))
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let skip = (page as usize - 1) * limit as usize;

        StorePage {
            total: matching.len(),
            stores: matching
                .into_iter()
                .skip(skip)
                .take(limit as usize)
                .cloned()
                .collect(),
            page,
            limit,
        }
    }

    pub(crate) fn update_job(
        &mut self,
        id: &JobId,
        expected: JobStatus,
        patch: JobPatch,
    ) -> Result<bool, RepoError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| &j.id == id)
            .ok_or_else(|| RepoError::JobNotFound(id.to_string()))?;

        if job.status != expected {
            return Ok(false);
        }

        patch.apply(job, Utc::now());
        Ok(true)
    }

    pub(crate) fn latest_job(&self, store_id: &StoreId) -> Option<Job> {
        // max_by_key keeps the last maximum, i.e. the latest insert on ties.
        self.jobs
            .iter()
            .filter(|j| &j.store_id == store_id)
            .max_by_key(|j| j.created_at)
            .cloned()
    }

    pub(crate) fn jobs_for_store(&self, store_id: &StoreId) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|j| &j.store_id == store_id)
            .cloned()
            .collect()
    }

    pub(crate) fn jobs_with_status(&self, status: JobStatus) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|j| j.status == status)
            .cloned()
            .collect()
    }

    pub(crate) fn append_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn events_for_store(&self, store_id: &StoreId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| &e.store_id == store_id)
            .cloned()
            .collect()
    }
}
