use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Public developer profile. Shares its id with the owning identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub years_experience: Option<i32>,
    pub open_to_work: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(owner: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: owner,
            email: email.into(),
            full_name: None,
            bio: None,
            avatar_url: None,
            location: None,
            website: None,
            github_url: None,
            linkedin_url: None,
            twitter_url: None,
            years_experience: None,
            open_to_work: false,
            created_at: now,
            updated_at: now,
        }
    }
}
