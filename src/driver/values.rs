// ABOUTME: Declarative values payload handed to the driver on install.
// ABOUTME: Describes store identity, plan, domain, and engine-specific site settings.

use serde::Serialize;

use crate::model::Store;
use crate::types::{StoreEngine, StorePlan};

const STORAGE_CLASS: &str = "standard";
const CERT_ISSUER: &str = "selfsigned";
const ADMIN_EMAIL: &str = "admin@example.com";

/// Values document rendered to YAML for the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseValues {
    pub store: StoreValues,
    pub global: GlobalValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordpress: Option<WordpressValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreValues {
    pub id: String,
    pub name: String,
    pub engine: StoreEngine,
    pub plan: StorePlan,
    pub created_by: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValues {
    pub base_domain: String,
    pub storage_class: String,
    pub cert_issuer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordpressValues {
    pub site: SiteValues,
    pub admin: AdminValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteValues {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminValues {
    pub username: String,
    pub email: String,
}

impl ReleaseValues {
    /// Build the payload for `store`, served at `host` under `base_domain`.
    pub fn for_store(store: &Store, host: &str, base_domain: &str) -> Self {
        let wordpress = match store.engine {
            StoreEngine::WooCommerce => Some(WordpressValues {
                site: SiteValues {
                    url: host.to_string(),
                    title: store
                        .display_name
                        .clone()
                        .unwrap_or_else(|| store.name.to_string()),
                },
                admin: AdminValues {
                    username: "admin".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                },
            }),
            StoreEngine::Medusa => None,
        };

        ReleaseValues {
            store: StoreValues {
                id: store.id.to_string(),
                name: store.name.to_string(),
                engine: store.engine,
                plan: store.plan,
                created_by: store.created_by.clone(),
                description: store.description.clone(),
            },
            global: GlobalValues {
                base_domain: base_domain.to_string(),
                storage_class: STORAGE_CLASS.to_string(),
                cert_issuer: CERT_ISSUER.to_string(),
            },
            wordpress,
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
