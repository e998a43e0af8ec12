// ABOUTME: Shared helper that wires the orchestrator to its real collaborators.
// ABOUTME: State file, helm/kubectl driver, and kubectl readiness check.

use std::sync::Arc;
use storefleet::config::Config;
use storefleet::driver::HelmDriver;
use storefleet::error::Result;
use storefleet::orchestrator::Orchestrator;
use storefleet::probe::KubectlReadiness;
use storefleet::repo::FileStore;

/// Build an orchestrator from the effective configuration.
pub fn connect(config: &Config) -> Result<Orchestrator> {
    let repo = FileStore::open(&config.state.path)?;

    let driver = HelmDriver::new(config.helm.clone(), config.kubectl.clone());
    let check = KubectlReadiness::new(
        config.kubectl.binary.clone(),
        config.kubectl.command_timeout,
    );

    Ok(Orchestrator::new(
        Arc::new(repo),
        Arc::new(driver),
        Arc::new(check),
        config.orchestrator_settings(),
    ))
}
