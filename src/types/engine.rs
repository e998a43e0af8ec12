// ABOUTME: Store engine and plan enums plus per-engine deployment profiles.
// ABOUTME: Engine support is decided by an exhaustive match, not string comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::StoreName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseKindError {
    pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// E-commerce engine backing a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreEngine {
    #[serde(rename = "woocommerce")]
    WooCommerce,
    #[serde(rename = "medusa")]
    Medusa,
}

impl StoreEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreEngine::WooCommerce => "woocommerce",
            StoreEngine::Medusa => "medusa",
        }
    }

    /// Deployment profile for this engine, or `None` while the engine is
    /// accepted by the API but cannot be provisioned yet.
    pub fn profile(&self) -> Option<EngineProfile> {
        match self {
            StoreEngine::WooCommerce => Some(WOOCOMMERCE),
            StoreEngine::Medusa => None,
        }
    }
}

impl fmt::Display for StoreEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreEngine {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "woocommerce" => Ok(StoreEngine::WooCommerce),
            "medusa" => Ok(StoreEngine::Medusa),
            other => Err(ParseKindError::new("engine", other, "woocommerce, medusa")),
        }
    }
}

/// Sizing tier of a store; interpreted by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorePlan {
    #[default]
    Basic,
    Standard,
    Premium,
}

impl StorePlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorePlan::Basic => "basic",
            StorePlan::Standard => "standard",
            StorePlan::Premium => "premium",
        }
    }
}

impl fmt::Display for StorePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorePlan {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(StorePlan::Basic),
            "standard" => Ok(StorePlan::Standard),
            "premium" => Ok(StorePlan::Premium),
            other => Err(ParseKindError::new(
                "plan",
                other,
                "basic, standard, premium",
            )),
        }
    }
}

/// How a provisionable engine is packaged and exposed on the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineProfile {
    /// Chart directory under the configured chart path.
    pub chart: &'static str,
    /// Suffix of the workload the chart creates, used for readiness polling.
    pub workload_suffix: &'static str,
    /// Path of the admin UI relative to the storefront URL.
    pub admin_path: &'static str,
    /// Admin account created by the chart.
    pub admin_username: &'static str,
}

const WOOCOMMERCE: EngineProfile = EngineProfile {
    chart: "woocommerce",
    workload_suffix: "wordpress",
    admin_path: "/wp-admin",
    admin_username: "admin",
};

impl EngineProfile {
    /// Name of the deployment whose ready replicas signal a live store.
    pub fn workload_name(&self, store: &StoreName) -> String {
        format!("store-{}-{}", store, self.workload_suffix)
    }

    /// Name of the secret holding the admin password. Only the reference is
    /// ever stored.
    pub fn credentials_secret(&self, store: &StoreName) -> String {
        format!("store-{}-{}-credentials", store, self.workload_suffix)
    }
}
