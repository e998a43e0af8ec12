// ABOUTME: Config scaffolding for new deployments.
// ABOUTME: Creates a commented storefleet.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, base_domain: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::default();
    if let Some(domain) = base_domain {
        if domain.trim().is_empty() {
            return Err(Error::InvalidConfig("base domain must not be empty".to_string()));
        }
        config.provisioning.base_domain = domain.to_string();
    }

    std::fs::write(&config_path, generate_template_yaml(&config))?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let p = &config.provisioning;
    format!(
        r#"provisioning:
  # Tasks running at once; further work waits (queue) or is refused (reject)
  max_concurrent: {}
  admission: {}
  base_domain: {}
  readiness:
    max_attempts: {}
    interval: {}s
  # Running jobs older than this are failed by `storefleet reconcile`
  stale_job_after: {}m
helm:
  binary: {}
  chart_path: {}
  timeout: {}s
  uninstall_timeout: {}s
kubectl:
  binary: {}
  command_timeout: {}s
  namespace_delete_timeout: {}s
state:
  path: {}
"#,
        p.max_concurrent,
        p.admission,
        p.base_domain,
        p.readiness.max_attempts,
        p.readiness.interval.as_secs(),
        p.stale_job_after.as_secs() / 60,
        config.helm.binary.display(),
        config.helm.chart_path.display(),
        config.helm.timeout.as_secs(),
        config.helm.uninstall_timeout.as_secs(),
        config.kubectl.binary.display(),
        config.kubectl.command_timeout.as_secs(),
        config.kubectl.namespace_delete_timeout.as_secs(),
        config.state.path.display(),
    )
}
