use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Connection, ConnectionStatus, Endorsement, Message, Profile, Proficiency, Project, Skill, User,
};

/// Offset pagination window applied by every list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 50, offset: 0 }
    }
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.max(0),
            offset: offset.max(0),
        }
    }

    /// Window an already ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkillFilter {
    pub profile_id: Option<Uuid>,
    pub min_proficiency: Option<Proficiency>,
}

impl SkillFilter {
    pub fn matches(&self, skill: &Skill) -> bool {
        self.profile_id.map_or(true, |id| skill.profile_id == id)
            && self.min_proficiency.map_or(true, |min| skill.proficiency >= min)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EndorsementFilter {
    pub skill_id: Option<Uuid>,
    pub endorsee_id: Option<Uuid>,
    pub endorser_id: Option<Uuid>,
}

impl EndorsementFilter {
    pub fn matches(&self, endorsement: &Endorsement) -> bool {
        self.skill_id.map_or(true, |id| endorsement.skill_id == id)
            && self.endorsee_id.map_or(true, |id| endorsement.endorsee_id == id)
            && self.endorser_id.map_or(true, |id| endorsement.endorser_id == id)
    }
}

/// Relational storage behind the service layer.
///
/// Implementations enforce the uniqueness rules themselves and report
/// violations as `DatabaseError::UniqueViolation`:
/// - one username per identity
/// - one skill name per profile (case-insensitive)
/// - one connection per unordered pair of profiles
/// - one endorsement per (endorser, skill)
///
/// State transitions are conditional single-row updates: they return `None`
/// when the row is absent or no longer in the expected state, and the caller
/// decides how to surface that.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Identities

    /// Insert an identity together with its profile
    async fn create_account(&self, user: &User, profile: &Profile) -> Result<(), DatabaseError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    // Profiles

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError>;
    async fn list_profiles(&self, page: Page) -> Result<Vec<Profile>, DatabaseError>;
    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;
    /// Remove a profile, its identity and every record that references it
    async fn delete_profile(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Skills

    async fn insert_skill(&self, skill: &Skill) -> Result<(), DatabaseError>;
    async fn get_skill(&self, id: Uuid) -> Result<Option<Skill>, DatabaseError>;
    async fn list_skills(&self, filter: &SkillFilter, page: Page) -> Result<Vec<Skill>, DatabaseError>;
    async fn update_skill(&self, skill: &Skill) -> Result<(), DatabaseError>;
    async fn delete_skill(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Projects

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn list_projects(&self, profile_id: Option<Uuid>, page: Page) -> Result<Vec<Project>, DatabaseError>;
    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError>;
    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Connections

    async fn insert_connection(&self, connection: &Connection) -> Result<(), DatabaseError>;
    async fn get_connection(&self, id: Uuid) -> Result<Option<Connection>, DatabaseError>;
    async fn find_connection_between(&self, a: Uuid, b: Uuid) -> Result<Option<Connection>, DatabaseError>;
    /// Turn a rejected record back into a pending request from `initiator` to `target`
    async fn reopen_connection(
        &self,
        id: Uuid,
        initiator: Uuid,
        target: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError>;
    /// Move a connection from `from` to `to`, stamping `responded_at`
    async fn transition_connection(
        &self,
        id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError>;
    /// Delete a connection only while it is in `expected` state
    async fn delete_connection(&self, id: Uuid, expected: ConnectionStatus) -> Result<bool, DatabaseError>;
    /// Accepted connections of a profile, most recently accepted first
    async fn list_accepted_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError>;
    /// Pending connections a profile sent or received, newest first
    async fn list_pending_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError>;

    // Messages

    async fn insert_message(&self, message: &Message) -> Result<(), DatabaseError>;
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, DatabaseError>;
    /// Set the read flag; an already read message keeps its original `read_at`
    async fn mark_message_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, DatabaseError>;
    /// Messages exchanged between two profiles, oldest first
    async fn list_conversation(&self, a: Uuid, b: Uuid, page: Page) -> Result<Vec<Message>, DatabaseError>;
    /// Messages received by a profile, newest first
    async fn list_inbox(&self, recipient_id: Uuid, unread_only: bool, page: Page) -> Result<Vec<Message>, DatabaseError>;

    // Endorsements

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), DatabaseError>;
    async fn get_endorsement(&self, id: Uuid) -> Result<Option<Endorsement>, DatabaseError>;
    async fn delete_endorsement(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn list_endorsements(&self, filter: &EndorsementFilter, page: Page) -> Result<Vec<Endorsement>, DatabaseError>;
    async fn count_endorsements(&self, skill_id: Uuid) -> Result<i64, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_slices_window() {
        let page = Page::new(2, 1);
        assert_eq!(page.slice(vec![1, 2, 3, 4]), vec![2, 3]);
    }

    #[test]
    fn page_clamps_negative_values() {
        assert_eq!(Page::new(-5, -1), Page { limit: 0, offset: 0 });
    }

    #[test]
    fn skill_filter_applies_minimum_level() {
        let owner = Uuid::new_v4();
        let skill = Skill::new(owner, "Rust", Proficiency::Intermediate);
        let filter = SkillFilter {
            profile_id: Some(owner),
            min_proficiency: Some(Proficiency::Advanced),
        };
        assert!(!filter.matches(&skill));
        assert!(SkillFilter::default().matches(&skill));
    }
}
