// ABOUTME: Infrastructure driver contract used by the orchestrator.
// ABOUTME: Install/uninstall of a store release with no retry logic of its own.

mod error;
mod helm;
mod values;

pub use error::DriverError;
pub use helm::HelmDriver;
pub use values::{
    AdminValues, GlobalValues, ReleaseValues, SiteValues, StoreValues, WordpressValues,
};

use async_trait::async_trait;

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub release: String,
    pub namespace: String,
    /// Chart directory name under the driver's chart path.
    pub chart: String,
    pub values: ReleaseValues,
}

/// Output of a successful install.
#[derive(Debug, Clone, Default)]
pub struct InstallOutput {
    pub output: String,
}

/// Result of an uninstall. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    /// The release did not exist; nothing to tear down.
    NotFound,
}

/// Applies infrastructure changes for a store release.
///
/// Implementations must bound every call with a timeout and must not retry;
/// retry and failure policy belong to the caller.
#[async_trait]
pub trait InfraDriver: Send + Sync {
    /// Create or upgrade the release, creating the namespace first if absent.
    async fn install(&self, request: &InstallRequest) -> Result<InstallOutput, DriverError>;

    /// Remove the release. A missing release is reported as `NotFound`, not an error.
    async fn uninstall(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<UninstallOutcome, DriverError>;

    /// Delete the namespace that held the release. Missing namespaces are not an error.
    async fn delete_namespace(&self, namespace: &str) -> Result<(), DriverError>;

    /// Current release status as reported by the tool, `None` if the release is absent.
    async fn release_status(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<Option<serde_json::Value>, DriverError>;

    /// Cheap liveness probe of the tool itself.
    async fn available(&self) -> bool;
}
