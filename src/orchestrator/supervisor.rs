// ABOUTME: Supervised execution of detached lifecycle tasks.
// ABOUTME: Gates admission with a semaphore and turns panics into recorded failures.

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use super::error::LifecycleError;
use super::settings::AdmissionPolicy;
use crate::model::{JobType, Store};
use crate::types::{JobId, StoreId};

/// Terminal result of one supervised task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub store_id: StoreId,
    pub job_id: JobId,
    pub kind: JobType,
    pub result: Result<Store, LifecycleError>,
}

/// Admission decision taken before a task is spawned.
#[derive(Debug)]
pub enum Admission {
    /// A slot is held already.
    Granted(OwnedSemaphorePermit),
    /// The task waits for a slot once spawned.
    Deferred,
}

/// Runs lifecycle tasks, at most `capacity` at a time.
pub struct TaskSupervisor {
    tasks: Mutex<JoinSet<TaskOutcome>>,
    /// Outcomes reaped on spawn, handed out by the next `wait_idle`.
    reaped: Mutex<Vec<TaskOutcome>>,
    permits: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    active: Arc<Mutex<HashSet<JobId>>>,
}

impl TaskSupervisor {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            tasks: Mutex::new(JoinSet::new()),
            reaped: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Tasks spawned and not yet finished, queued ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether a task for `job_id` is queued or running in this process.
    pub fn is_active(&self, job_id: &JobId) -> bool {
        self.active.lock().contains(job_id)
    }

    /// Decide whether new work may be accepted.
    ///
    /// # Errors
    ///
    /// Returns `AtCapacity` under the reject policy when no slot is free.
    pub fn admit(&self, policy: AdmissionPolicy) -> Result<Admission, LifecycleError> {
        match policy {
            AdmissionPolicy::Queue => Ok(Admission::Deferred),
            AdmissionPolicy::Reject => self
                .permits
                .clone()
                .try_acquire_owned()
                .map(Admission::Granted)
                .map_err(|_| LifecycleError::AtCapacity(self.capacity)),
        }
    }

    /// Spawn `work` under supervision.
    ///
    /// `recover` runs if `work` panics so the failure still lands in the
    /// lifecycle records.
    pub fn spawn<F, R>(
        &self,
        store_id: StoreId,
        job_id: JobId,
        kind: JobType,
        admission: Admission,
        work: F,
        recover: R,
    ) where
        F: Future<Output = Result<Store, LifecycleError>> + Send + 'static,
        R: FnOnce(LifecycleError) -> BoxFuture<'static, ()> + Send + 'static,
    {
        let permits = self.permits.clone();
        let in_flight = self.in_flight.clone();
        let active = self.active.clone();

        active.lock().insert(job_id.clone());
        in_flight.fetch_add(1, Ordering::SeqCst);

        let task = async move {
            let permit = match admission {
                Admission::Granted(permit) => Ok(permit),
                Admission::Deferred => {
                    tracing::debug!(store_id = %store_id, job_id = %job_id, "waiting for a task slot");
                    permits.acquire_owned().await.map_err(|_| {
                        LifecycleError::Internal("task pool is shut down".to_string())
                    })
                }
            };

            let result = match permit {
                Err(err) => Err(err),
                Ok(_permit) => match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let err = LifecycleError::Internal(format!(
                            "task panicked: {}",
                            panic_message(panic.as_ref())
                        ));
                        recover(err.clone()).await;
                        Err(err)
                    }
                },
            };

            active.lock().remove(&job_id);
            in_flight.fetch_sub(1, Ordering::SeqCst);

            TaskOutcome {
                store_id,
                job_id,
                kind,
                result,
            }
        };

        let mut tasks = self.tasks.lock();
        while let Some(joined) = tasks.try_join_next() {
            if let Some(outcome) = log_reaped(joined) {
                self.reaped.lock().push(outcome);
            }
        }
        tasks.spawn(task);
    }

    /// Wait for every task, including ones spawned while waiting.
    pub async fn wait_idle(&self) -> Vec<TaskOutcome> {
        let mut outcomes = std::mem::take(&mut *self.reaped.lock());
        loop {
            let mut batch = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                break;
            }
            while let Some(joined) = batch.join_next().await {
                match joined {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => tracing::error!(error = %e, "supervised task was aborted"),
                }
            }
        }
        outcomes
    }
}

fn log_reaped(joined: Result<TaskOutcome, tokio::task::JoinError>) -> Option<TaskOutcome> {
    match joined {
        Ok(outcome) => {
            match &outcome.result {
                Ok(_) => tracing::debug!(store_id = %outcome.store_id, kind = %outcome.kind, "task finished"),
                Err(e) => tracing::debug!(store_id = %outcome.store_id, kind = %outcome.kind, error = %e, "task failed"),
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, "supervised task was aborted");
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
