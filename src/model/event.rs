// ABOUTME: Append-only audit events describing lifecycle milestones.
// ABOUTME: Events are never updated or removed once recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EventId, StoreId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ProvisioningStarted,
    ProvisioningCompleted,
    ProvisioningFailed,
    DeletionStarted,
    DeletionCompleted,
    DeletionFailed,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProvisioningStarted => "provisioning_started",
            EventType::ProvisioningCompleted => "provisioning_completed",
            EventType::ProvisioningFailed => "provisioning_failed",
            EventType::DeletionStarted => "deletion_started",
            EventType::DeletionCompleted => "deletion_completed",
            EventType::DeletionFailed => "deletion_failed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub store_id: StoreId,
    pub event_type: EventType,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        store_id: StoreId,
        event_type: EventType,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Event {
            id: EventId::generate(),
            store_id,
            event_type,
            message: message.into(),
            created_at: now,
        }
    }
}
