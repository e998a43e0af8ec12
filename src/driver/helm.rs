// ABOUTME: Driver implementation that shells out to helm and kubectl.
// ABOUTME: Writes the values payload to a temp file and bounds every call with a deadline.

use async_trait::async_trait;
use snafu::ResultExt;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{FailedSnafu, StatusParseSnafu, ValuesEncodeSnafu, ValuesFileSnafu};
use super::{DriverError, InfraDriver, InstallOutput, InstallRequest, UninstallOutcome};
use crate::config::{HelmConfig, KubectlConfig};
use crate::process::{CommandOutput, run_command};

/// Extra time the outer deadline allows beyond helm's own `--timeout`.
const INSTALL_DEADLINE_BUFFER: Duration = Duration::from_secs(30);
const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);
const STATUS_TIMEOUT: Duration = Duration::from_secs(30);
const RELEASE_NOT_FOUND: &str = "release: not found";

/// Drives store releases through the helm and kubectl CLIs.
#[derive(Debug, Clone)]
pub struct HelmDriver {
    helm: HelmConfig,
    kubectl: KubectlConfig,
    values_dir: PathBuf,
}

impl HelmDriver {
    pub fn new(helm: HelmConfig, kubectl: KubectlConfig) -> Self {
        Self {
            helm,
            kubectl,
            values_dir: std::env::temp_dir(),
        }
    }

    /// Directory for temporary values files (defaults to the system temp dir).
    pub fn values_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.values_dir = dir.into();
        self
    }

    async fn helm(&self, args: Vec<String>, timeout: Duration) -> Result<CommandOutput, DriverError> {
        Ok(run_command(&self.helm.binary, &args, timeout).await?)
    }

    async fn kubectl(
        &self,
        args: Vec<String>,
        timeout: Duration,
    ) -> Result<CommandOutput, DriverError> {
        Ok(run_command(&self.kubectl.binary, &args, timeout).await?)
    }

    /// Create the namespace unless it already exists.
    async fn ensure_namespace(&self, namespace: &str) -> Result<(), DriverError> {
        let timeout = self.kubectl.command_timeout;
        let existing = self
            .kubectl(args(["get", "namespace", namespace]), timeout)
            .await?;
        if existing.success {
            return Ok(());
        }

        let created = self
            .kubectl(args(["create", "namespace", namespace]), timeout)
            .await?;
        if created.success || created.mentions("AlreadyExists") {
            tracing::info!(namespace, "created namespace");
            return Ok(());
        }

        FailedSnafu {
            operation: "kubectl create namespace",
            output: created,
        }
        .fail()
    }

    async fn write_values(&self, request: &InstallRequest) -> Result<PathBuf, DriverError> {
        let yaml = request.values.to_yaml().context(ValuesEncodeSnafu)?;
        let path = self
            .values_dir
            .join(format!("storefleet-values-{}.yaml", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, yaml)
            .await
            .context(ValuesFileSnafu { path: path.clone() })?;
        Ok(path)
    }

    fn install_args(&self, request: &InstallRequest, values_file: &std::path::Path) -> Vec<String> {
        let chart = self.helm.chart_path.join(&request.chart);
        vec![
            "upgrade".to_string(),
            "--install".to_string(),
            request.release.clone(),
            chart.display().to_string(),
            "--namespace".to_string(),
            request.namespace.clone(),
            "--create-namespace".to_string(),
            "--values".to_string(),
            values_file.display().to_string(),
            "--timeout".to_string(),
            format!("{}s", self.helm.timeout.as_secs()),
            "--wait".to_string(),
            "--atomic".to_string(),
        ]
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl InfraDriver for HelmDriver {
    async fn install(&self, request: &InstallRequest) -> Result<InstallOutput, DriverError> {
        tracing::info!(
            release = %request.release,
            namespace = %request.namespace,
            chart = %request.chart,
            "installing release"
        );

        self.ensure_namespace(&request.namespace).await?;

        let values_file = self.write_values(request).await?;
        let result = self
            .helm(
                self.install_args(request, &values_file),
                self.helm.timeout + INSTALL_DEADLINE_BUFFER,
            )
            .await;

        if let Err(e) = tokio::fs::remove_file(&values_file).await {
            tracing::debug!(path = %values_file.display(), error = %e, "could not remove values file");
        }

        let output = result?;
        if !output.success {
            tracing::error!(
                release = %request.release,
                namespace = %request.namespace,
                stderr = %output.stderr.trim(),
                "helm install failed"
            );
            return FailedSnafu {
                operation: "helm install",
                output,
            }
            .fail();
        }

        tracing::info!(release = %request.release, namespace = %request.namespace, "helm install completed");
        Ok(InstallOutput {
            output: output.stdout,
        })
    }

    async fn uninstall(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<UninstallOutcome, DriverError> {
        tracing::info!(release, namespace, "uninstalling release");

        let output = self
            .helm(
                args(["uninstall", release, "--namespace", namespace, "--wait"]),
                self.helm.uninstall_timeout,
            )
            .await?;

        if output.success {
            return Ok(UninstallOutcome::Removed);
        }

        if output.mentions(RELEASE_NOT_FOUND) {
            tracing::warn!(release, namespace, "release not found during uninstall");
            return Ok(UninstallOutcome::NotFound);
        }

        FailedSnafu {
            operation: "helm uninstall",
            output,
        }
        .fail()
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), DriverError> {
        let output = self
            .kubectl(
                args([
                    "delete",
                    "namespace",
                    namespace,
                    "--force",
                    "--grace-period=0",
                    "--ignore-not-found",
                ]),
                self.kubectl.namespace_delete_timeout,
            )
            .await?;

        if output.success {
            tracing::info!(namespace, "deleted namespace");
            return Ok(());
        }

        FailedSnafu {
            operation: "kubectl delete namespace",
            output,
        }
        .fail()
    }

    async fn release_status(
        &self,
        release: &str,
        namespace: &str,
    ) -> Result<Option<serde_json::Value>, DriverError> {
        let output = self
            .helm(
                args(["status", release, "--namespace", namespace, "--output", "json"]),
                STATUS_TIMEOUT,
            )
            .await?;

        if !output.success {
            if output.mentions(RELEASE_NOT_FOUND) {
                return Ok(None);
            }
            return FailedSnafu {
                operation: "helm status",
                output,
            }
            .fail();
        }

        let status = serde_json::from_str(&output.stdout).context(StatusParseSnafu)?;
        Ok(Some(status))
    }

    async fn available(&self) -> bool {
        match self.helm(args(["version"]), AVAILABILITY_TIMEOUT).await {
            Ok(output) => output.success,
            Err(e) => {
                tracing::debug!(error = %e, "helm is not available");
                false
            }
        }
    }
}
