// ABOUTME: Configuration types and parsing for storefleet.yml.
// ABOUTME: Handles file discovery, defaults, environment overrides, and validation.

mod init;

pub use init::init_config;

use crate::error::{Error, Result};
use crate::orchestrator::{AdmissionPolicy, OrchestratorSettings};
use crate::probe::ProbePolicy;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "storefleet.yml";
pub const CONFIG_FILENAME_ALT: &str = "storefleet.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".storefleet/config.yml";

pub const ENV_BASE_DOMAIN: &str = "BASE_DOMAIN";
pub const ENV_HELM_CHART_PATH: &str = "HELM_CHART_PATH";
pub const ENV_HELM_TIMEOUT: &str = "HELM_TIMEOUT";
pub const ENV_MAX_CONCURRENT: &str = "MAX_CONCURRENT_PROVISIONING";
pub const ENV_STATE_PATH: &str = "STOREFLEET_STATE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provisioning: ProvisioningConfig,
    pub helm: HelmConfig,
    pub kubectl: KubectlConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Maximum number of provision/delete tasks running at once.
    pub max_concurrent: usize,
    pub admission: AdmissionPolicy,
    pub base_domain: String,
    pub readiness: ReadinessConfig,
    /// Running jobs older than this are failed by `reconcile`.
    #[serde(with = "humantime_serde")]
    pub stale_job_after: Duration,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            admission: AdmissionPolicy::default(),
            base_domain: "127.0.0.1.nip.io".to_string(),
            readiness: ReadinessConfig::default(),
            stale_job_after: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        let policy = ProbePolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            interval: policy.interval,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    pub binary: PathBuf,
    /// Directory holding one chart directory per engine.
    pub chart_path: PathBuf,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub uninstall_timeout: Duration,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("helm"),
            chart_path: PathBuf::from("/charts/helm/store-engine"),
            timeout: Duration::from_secs(600),
            uninstall_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KubectlConfig {
    pub binary: PathBuf,
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub namespace_delete_timeout: Duration,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kubectl"),
            command_timeout: Duration::from_secs(10),
            namespace_delete_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// JSON file holding stores, jobs, and events between invocations.
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".storefleet/state.json"),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Load the effective configuration.
    ///
    /// An explicit path must exist. Without one, the config is discovered in
    /// `dir` and defaults apply when no file is present. Environment
    /// overrides are applied last, then the result is validated.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let mut config = match explicit {
            Some(path) if !path.exists() => return Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::load(path)?,
            None => match Self::discover(dir) {
                Ok(config) => config,
                Err(Error::ConfigNotFound(_)) => {
                    tracing::debug!(dir = %dir.display(), "no config file found, using defaults");
                    Config::default()
                }
                Err(e) => return Err(e),
            },
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(domain) = env_string(ENV_BASE_DOMAIN) {
            self.provisioning.base_domain = domain;
        }
        if let Some(path) = env_string(ENV_HELM_CHART_PATH) {
            self.helm.chart_path = PathBuf::from(path);
        }
        if let Some(secs) = env_parse::<u64>(ENV_HELM_TIMEOUT)? {
            self.helm.timeout = Duration::from_secs(secs);
        }
        if let Some(max) = env_parse::<usize>(ENV_MAX_CONCURRENT)? {
            self.provisioning.max_concurrent = max;
        }
        if let Some(path) = env_string(ENV_STATE_PATH) {
            self.state.path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.provisioning.max_concurrent == 0 {
            return Err(Error::InvalidConfig(
                "provisioning.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.provisioning.readiness.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "provisioning.readiness.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.provisioning.base_domain.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "provisioning.base_domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_policy(&self) -> ProbePolicy {
        ProbePolicy {
            max_attempts: self.provisioning.readiness.max_attempts,
            interval: self.provisioning.readiness.interval,
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            base_domain: self.provisioning.base_domain.clone(),
            max_concurrent: self.provisioning.max_concurrent,
            admission: self.provisioning.admission,
            probe: self.probe_policy(),
            stale_job_after: self.provisioning.stale_job_after,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env_string(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::InvalidConfig(format!("{name}={raw}: {e}"))),
    }
}
