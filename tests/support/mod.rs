// ABOUTME: Test support utilities.
// ABOUTME: Provides fake driver and readiness collaborators plus a wired orchestrator.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storefleet::driver::{
    DriverError, InfraDriver, InstallOutput, InstallRequest, UninstallOutcome,
};
use storefleet::model::{Event, EventType, Job, JobPatch, JobStatus, Store};
use storefleet::orchestrator::{AdmissionPolicy, Orchestrator, OrchestratorSettings};
use storefleet::probe::{ProbeError, ProbePolicy, ReadinessCheck};
use storefleet::process::CommandOutput;
use storefleet::repo::{
    LifecycleStore, MemoryStore, RepoError, StorePage, StoreQuery, Transition,
};
use storefleet::types::{JobId, StoreId, StoreName};
use tokio::sync::Notify;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("storefleet=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum DriverCall {
    Install { release: String, namespace: String, chart: String },
    Uninstall { release: String, namespace: String },
    DeleteNamespace(String),
}

/// Scriptable in-memory driver.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeDriver {
    pub calls: Mutex<Vec<DriverCall>>,
    pub install_error: Mutex<Option<String>>,
    pub uninstall_error: Mutex<Option<String>>,
    pub release_missing: Mutex<bool>,
    pub unavailable: Mutex<bool>,
    pub panic_on_install: Mutex<bool>,
    /// When set, install blocks until notified.
    pub install_gate: Mutex<Option<Arc<Notify>>>,
}

#[allow(dead_code)]
impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_install(&self, stderr: &str) {
        *self.install_error.lock() = Some(stderr.to_string());
    }

    pub fn fail_uninstall(&self, stderr: &str) {
        *self.uninstall_error.lock() = Some(stderr.to_string());
    }

    pub fn release_missing(&self) {
        *self.release_missing.lock() = true;
    }

    pub fn go_down(&self) {
        *self.unavailable.lock() = true;
    }

    pub fn panic_on_install(&self) {
        *self.panic_on_install.lock() = true;
    }

    /// Hold every install until the returned handle is notified.
    pub fn gate_installs(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.install_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    fn failed(operation: &str, stderr: &str) -> DriverError {
        DriverError::Failed {
            operation: operation.to_string(),
            output: CommandOutput {
                success: false,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        }
    }
}

#[async_trait]
impl InfraDriver for FakeDriver {
    async fn install(&self, request: &InstallRequest) -> Result<InstallOutput, DriverError> {
        self.calls.lock().push(DriverCall::Install {
            release: request.release.clone(),
            namespace: request.namespace.clone(),
            chart: request.chart.clone(),
        });

        let gate = self.install_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if *self.panic_on_install.lock() {
            panic!("driver exploded");
        }

        match self.install_error.lock().clone() {
            Some(stderr) => Err(Self::failed("helm install", &stderr)),
            None => Ok(InstallOutput {
                output: "STATUS: deployed".to_string(),
            }),
        }
    }

    async fn uninstall(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<UninstallOutcome, DriverError> {
        self.calls.lock().push(DriverCall::Uninstall {
            release: release.to_string(),
            namespace: namespace.to_string(),
        });

        if let Some(stderr) = self.uninstall_error.lock().clone() {
            return Err(Self::failed("helm uninstall", &stderr));
        }
        if *self.release_missing.lock() {
            return Ok(UninstallOutcome::NotFound);
        }
        Ok(UninstallOutcome::Removed)
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), DriverError> {
        self.calls
            .lock()
            .push(DriverCall::DeleteNamespace(namespace.to_string()));
        Ok(())
    }

    async fn release_status(
        &self,
        release: &str,
        _namespace: &str,
    ) -> Result<Option<serde_json::Value>, DriverError> {
        if *self.release_missing.lock() {
            return Ok(None);
        }
        Ok(Some(serde_json::json!({
            "name": release,
            "info": { "status": "deployed" }
        })))
    }

    async fn available(&self) -> bool {
        !*self.unavailable.lock()
    }
}

/// Readiness check that reports ready after a number of polls, or never.
#[allow(dead_code)]
pub struct FakeReadiness {
    polls: AtomicU32,
    ready_after: Option<u32>,
}

#[allow(dead_code)]
impl FakeReadiness {
    pub fn ready_after(polls: u32) -> Arc<Self> {
        Arc::new(Self {
            polls: AtomicU32::new(0),
            ready_after: Some(polls),
        })
    }

    pub fn never() -> Arc<Self> {
        Arc::new(Self {
            polls: AtomicU32::new(0),
            ready_after: None,
        })
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessCheck for FakeReadiness {
    async fn ready_replicas(&self, _namespace: &str, _workload: &str) -> Result<u32, ProbeError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.ready_after {
            Some(after) if n >= after => Ok(1),
            // Early polls look like a deployment that does not exist yet
            Some(_) if n == 1 => Err(ProbeError::Check("deployment not found".to_string())),
            _ => Ok(0),
        }
    }
}

/// Settings with millisecond polling so tests stay fast.
#[allow(dead_code)]
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        base_domain: "stores.test".to_string(),
        max_concurrent: 5,
        admission: AdmissionPolicy::Queue,
        probe: ProbePolicy {
            max_attempts: 5,
            interval: Duration::from_millis(2),
        },
        stale_job_after: Duration::from_secs(15 * 60),
    }
}

/// Orchestrator, its in-memory store, and the fakes behind it.
#[allow(dead_code)]
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub repo: Arc<MemoryStore>,
    pub driver: Arc<FakeDriver>,
    pub readiness: Arc<FakeReadiness>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with(FakeReadiness::ready_after(2), fast_settings())
    }

    pub fn with(readiness: Arc<FakeReadiness>, settings: OrchestratorSettings) -> Self {
        init_tracing();
        let repo = Arc::new(MemoryStore::new());
        let driver = FakeDriver::new();
        let orchestrator = Orchestrator::new(
            repo.clone(),
            driver.clone(),
            readiness.clone(),
            settings,
        );
        Self {
            orchestrator,
            repo,
            driver,
            readiness,
        }
    }

    /// A second orchestrator over the same store, as after a restart.
    pub fn restarted(&self, settings: OrchestratorSettings) -> Orchestrator {
        Orchestrator::new(
            self.repo.clone(),
            self.driver.clone(),
            self.readiness.clone(),
            settings,
        )
    }
}

/// Memory store that refuses to persist one kind of event.
#[derive(Default)]
#[allow(dead_code)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub refused_event: Mutex<Option<EventType>>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn refusing(event_type: EventType) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            refused_event: Mutex::new(Some(event_type)),
        })
    }
}

#[async_trait]
impl LifecycleStore for FlakyStore {
    async fn create_store(&self, store: Store, job: Job) -> Result<(), RepoError> {
        self.inner.create_store(store, job).await
    }

    async fn store(&self, id: &StoreId) -> Result<Option<Store>, RepoError> {
        self.inner.store(id).await
    }

    async fn store_by_name(&self, name: &StoreName) -> Result<Option<Store>, RepoError> {
        self.inner.store_by_name(name).await
    }

    async fn transition_store(
        &self,
        id: &StoreId,
        transition: Transition<'_>,
    ) -> Result<Option<Store>, RepoError> {
        self.inner.transition_store(id, transition).await
    }

    async fn list_stores(&self, query: &StoreQuery) -> Result<StorePage, RepoError> {
        self.inner.list_stores(query).await
    }

    async fn update_job(
        &self,
        id: &JobId,
        expected: JobStatus,
        patch: JobPatch,
    ) -> Result<bool, RepoError> {
        self.inner.update_job(id, expected, patch).await
    }

    async fn latest_job(&self, store_id: &StoreId) -> Result<Option<Job>, RepoError> {
        self.inner.latest_job(store_id).await
    }

    async fn jobs_for_store(&self, store_id: &StoreId) -> Result<Vec<Job>, RepoError> {
        self.inner.jobs_for_store(store_id).await
    }

    async fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, RepoError> {
        self.inner.jobs_with_status(status).await
    }

    async fn append_event(&self, event: Event) -> Result<(), RepoError> {
        if *self.refused_event.lock() == Some(event.event_type) {
            return Err(RepoError::Io(std::io::Error::other("disk full")));
        }
        self.inner.append_event(event).await
    }

    async fn events_for_store(&self, store_id: &StoreId) -> Result<Vec<Event>, RepoError> {
        self.inner.events_for_store(store_id).await
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.inner.ping().await
    }
}
