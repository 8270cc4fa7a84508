use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "connection_status", rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A networking request from `initiator_id` to `target_id`.
///
/// At most one record exists per unordered pair of profiles. `responded_at`
/// is stamped when the target accepts or rejects; for accepted connections
/// it is the acceptance time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub target_id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Connection {
    pub fn pending(initiator_id: Uuid, target_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            target_id,
            status: ConnectionStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    pub fn involves(&self, profile_id: Uuid) -> bool {
        self.initiator_id == profile_id || self.target_id == profile_id
    }

    /// True when this record links `a` and `b`, in either direction.
    pub fn links(&self, a: Uuid, b: Uuid) -> bool {
        (self.initiator_id == a && self.target_id == b) || (self.initiator_id == b && self.target_id == a)
    }

    pub fn other_party(&self, profile_id: Uuid) -> Uuid {
        if self.initiator_id == profile_id {
            self.target_id
        } else {
            self.initiator_id
        }
    }
}
