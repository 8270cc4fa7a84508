//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actions the access-control layer decides on.
/// Connection proposals are `Create`, revocations `Delete`; sending a
/// message is `Create`, listing a conversation is `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Respond,
    MarkRead,
}

/// The authenticated caller, passed explicitly into every service operation.
/// Its id is also the id of the caller's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
