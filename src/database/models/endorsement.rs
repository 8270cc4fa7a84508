use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Skill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Endorsement {
    pub id: Uuid,
    pub endorser_id: Uuid,
    pub endorsee_id: Uuid,
    pub skill_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Endorsement {
    /// The endorsee is always the skill's owner.
    pub fn new(endorser_id: Uuid, skill: &Skill) -> Self {
        Self {
            id: Uuid::new_v4(),
            endorser_id,
            endorsee_id: skill.profile_id,
            skill_id: skill.id,
            created_at: Utc::now(),
        }
    }
}
