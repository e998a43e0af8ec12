// ABOUTME: Store record and its lifecycle status.
// ABOUTME: Encodes the allowed status transitions of a managed store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ParseKindError, StoreEngine, StoreId, StoreName, StorePlan};

/// Lifecycle status of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Pending,
    Provisioning,
    Running,
    Failed,
    Deleting,
    Deleted,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Pending => "pending",
            StoreStatus::Provisioning => "provisioning",
            StoreStatus::Running => "running",
            StoreStatus::Failed => "failed",
            StoreStatus::Deleting => "deleting",
            StoreStatus::Deleted => "deleted",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `pending -> deleting` covers stores deleted while their provisioning
    /// task is still queued for admission.
    pub fn can_transition_to(&self, next: StoreStatus) -> bool {
        use StoreStatus::*;
        matches!(
            (self, next),
            (Pending, Provisioning)
                | (Pending, Deleting)
                | (Provisioning, Running)
                | (Provisioning, Failed)
                | (Running, Deleting)
                | (Failed, Deleting)
                | (Deleting, Deleted)
                | (Deleting, Failed)
        )
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreStatus {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(StoreStatus::Pending),
            "provisioning" => Ok(StoreStatus::Provisioning),
            "running" => Ok(StoreStatus::Running),
            "failed" => Ok(StoreStatus::Failed),
            "deleting" => Ok(StoreStatus::Deleting),
            "deleted" => Ok(StoreStatus::Deleted),
            other => Err(ParseKindError::new(
                "status",
                other,
                "pending, provisioning, running, failed, deleting, deleted",
            )),
        }
    }
}

/// A managed e-commerce instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: StoreName,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub engine: StoreEngine,
    pub plan: StorePlan,
    pub status: StoreStatus,
    pub status_message: Option<String>,
    pub namespace: Option<String>,
    pub release: Option<String>,
    pub url: Option<String>,
    pub admin_url: Option<String>,
    pub admin_username: Option<String>,
    /// Name of the secret holding the admin password, never the password.
    pub admin_password_secret: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields of a new store supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: StoreName,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub engine: StoreEngine,
    pub plan: StorePlan,
    pub created_by: Option<String>,
}

impl Store {
    /// Build a pending store with a fresh identifier.
    pub fn new(fields: NewStore, now: DateTime<Utc>) -> Self {
        Store {
            id: StoreId::generate(),
            name: fields.name,
            display_name: fields.display_name,
            description: fields.description,
            engine: fields.engine,
            plan: fields.plan,
            status: StoreStatus::Pending,
            status_message: None,
            namespace: None,
            release: None,
            url: None,
            admin_url: None,
            admin_username: None,
            admin_password_secret: None,
            created_by: fields.created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Field updates applied together with a status transition.
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct StorePatch {
    pub status_message: Option<String>,
    pub namespace: Option<String>,
    pub release: Option<String>,
    pub url: Option<String>,
    pub admin_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password_secret: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StorePatch {
    pub fn message(message: impl Into<String>) -> Self {
        StorePatch {
            status_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, store: &mut Store, now: DateTime<Utc>) {
        if let Some(v) = self.status_message {
            store.status_message = Some(v);
        }
        if let Some(v) = self.namespace {
            store.namespace = Some(v);
        }
        if let Some(v) = self.release {
            store.release = Some(v);
        }
        if let Some(v) = self.url {
            store.url = Some(v);
        }
        if let Some(v) = self.admin_url {
            store.admin_url = Some(v);
        }
        if let Some(v) = self.admin_username {
            store.admin_username = Some(v);
        }
        if let Some(v) = self.admin_password_secret {
            store.admin_password_secret = Some(v);
        }
        // deleted_at is written once
        if let Some(v) = self.deleted_at
            && store.deleted_at.is_none()
        {
            store.deleted_at = Some(v);
        }
        store.updated_at = now;
    }
}
