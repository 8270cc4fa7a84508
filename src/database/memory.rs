use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Connection, ConnectionStatus, Endorsement, Message, Profile, Project, Skill, User};
use super::store::{EndorsementFilter, Page, SkillFilter, Store};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    skills: Vec<Skill>,
    projects: Vec<Project>,
    connections: Vec<Connection>,
    messages: Vec<Message>,
    endorsements: Vec<Endorsement>,
}

impl Tables {
    fn has_profile(&self, id: Uuid) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }

    fn require_profile(&self, id: Uuid) -> Result<(), DatabaseError> {
        if self.has_profile(id) {
            Ok(())
        } else {
            Err(DatabaseError::ForeignKeyViolation(format!("profile {}", id)))
        }
    }

    fn skill_name_taken(&self, skill: &Skill) -> bool {
        let key = Skill::name_key(&skill.name);
        self.skills
            .iter()
            .any(|s| s.id != skill.id && s.profile_id == skill.profile_id && Skill::name_key(&s.name) == key)
    }
}

/// Process-local store used for development and tests.
///
/// Every write takes the single table lock, so uniqueness checks and the
/// insert they guard are atomic just like a database constraint.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_account(&self, user: &User, profile: &Profile) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        if t.users.iter().any(|u| u.id == user.id) || t.has_profile(profile.id) {
            return Err(DatabaseError::UniqueViolation("users_pkey".to_string()));
        }
        t.users.push(user.clone());
        t.profiles.push(profile.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self, page: Page) -> Result<Vec<Profile>, DatabaseError> {
        let t = self.tables.read().await;
        let mut profiles = t.profiles.clone();
        profiles.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(page.slice(profiles))
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        let slot = t
            .profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("profile {}", profile.id)))?;
        *slot = profile.clone();
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        if !t.has_profile(id) {
            return Ok(false);
        }

        let owned_skills: Vec<Uuid> = t.skills.iter().filter(|s| s.profile_id == id).map(|s| s.id).collect();
        t.endorsements.retain(|e| {
            e.endorser_id != id && e.endorsee_id != id && !owned_skills.contains(&e.skill_id)
        });
        t.skills.retain(|s| s.profile_id != id);
        t.projects.retain(|p| p.profile_id != id);
        t.connections.retain(|c| !c.involves(id));
        t.messages.retain(|m| m.sender_id != id && m.recipient_id != id);
        t.profiles.retain(|p| p.id != id);
        t.users.retain(|u| u.id != id);
        Ok(true)
    }

    async fn insert_skill(&self, skill: &Skill) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        t.require_profile(skill.profile_id)?;
        if t.skill_name_taken(skill) {
            return Err(DatabaseError::UniqueViolation("skills_profile_name_key".to_string()));
        }
        t.skills.push(skill.clone());
        Ok(())
    }

    async fn get_skill(&self, id: Uuid) -> Result<Option<Skill>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.skills.iter().find(|s| s.id == id).cloned())
    }

    async fn list_skills(&self, filter: &SkillFilter, page: Page) -> Result<Vec<Skill>, DatabaseError> {
        let t = self.tables.read().await;
        let mut skills: Vec<Skill> = t.skills.iter().filter(|s| filter.matches(s)).cloned().collect();
        skills.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(page.slice(skills))
    }

    async fn update_skill(&self, skill: &Skill) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        if t.skill_name_taken(skill) {
            return Err(DatabaseError::UniqueViolation("skills_profile_name_key".to_string()));
        }
        let slot = t
            .skills
            .iter_mut()
            .find(|s| s.id == skill.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("skill {}", skill.id)))?;
        *slot = skill.clone();
        Ok(())
    }

    async fn delete_skill(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        let before = t.skills.len();
        t.skills.retain(|s| s.id != id);
        if t.skills.len() == before {
            return Ok(false);
        }
        t.endorsements.retain(|e| e.skill_id != id);
        Ok(true)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        t.require_profile(project.profile_id)?;
        t.projects.push(project.clone());
        Ok(())
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, profile_id: Option<Uuid>, page: Page) -> Result<Vec<Project>, DatabaseError> {
        let t = self.tables.read().await;
        let mut projects: Vec<Project> = t
            .projects
            .iter()
            .filter(|p| profile_id.map_or(true, |id| p.profile_id == id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.slice(projects))
    }

    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        let slot = t
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", project.id)))?;
        *slot = project.clone();
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        let before = t.projects.len();
        t.projects.retain(|p| p.id != id);
        Ok(t.projects.len() != before)
    }

    async fn insert_connection(&self, connection: &Connection) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        t.require_profile(connection.initiator_id)?;
        t.require_profile(connection.target_id)?;
        if t
            .connections
            .iter()
            .any(|c| c.links(connection.initiator_id, connection.target_id))
        {
            return Err(DatabaseError::UniqueViolation("connections_pair_key".to_string()));
        }
        t.connections.push(connection.clone());
        Ok(())
    }

    async fn get_connection(&self, id: Uuid) -> Result<Option<Connection>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.connections.iter().find(|c| c.id == id).cloned())
    }

    async fn find_connection_between(&self, a: Uuid, b: Uuid) -> Result<Option<Connection>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.connections.iter().find(|c| c.links(a, b)).cloned())
    }

    async fn reopen_connection(
        &self,
        id: Uuid,
        initiator: Uuid,
        target: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError> {
        let mut t = self.tables.write().await;
        let Some(conn) = t
            .connections
            .iter_mut()
            .find(|c| c.id == id && c.status == ConnectionStatus::Rejected)
        else {
            return Ok(None);
        };
        conn.initiator_id = initiator;
        conn.target_id = target;
        conn.status = ConnectionStatus::Pending;
        conn.created_at = at;
        conn.responded_at = None;
        Ok(Some(conn.clone()))
    }

    async fn transition_connection(
        &self,
        id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError> {
        let mut t = self.tables.write().await;
        let Some(conn) = t.connections.iter_mut().find(|c| c.id == id && c.status == from) else {
            return Ok(None);
        };
        conn.status = to;
        conn.responded_at = Some(at);
        Ok(Some(conn.clone()))
    }

    async fn delete_connection(&self, id: Uuid, expected: ConnectionStatus) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        let before = t.connections.len();
        t.connections.retain(|c| !(c.id == id && c.status == expected));
        Ok(t.connections.len() != before)
    }

    async fn list_accepted_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError> {
        let t = self.tables.read().await;
        let mut accepted: Vec<Connection> = t
            .connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Accepted && c.involves(profile_id))
            .cloned()
            .collect();
        accepted.sort_by(|a, b| b.responded_at.cmp(&a.responded_at));
        Ok(page.slice(accepted))
    }

    async fn list_pending_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError> {
        let t = self.tables.read().await;
        let mut pending: Vec<Connection> = t
            .connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Pending && c.involves(profile_id))
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.slice(pending))
    }

    async fn insert_message(&self, message: &Message) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        t.require_profile(message.sender_id)?;
        t.require_profile(message.recipient_id)?;
        t.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn mark_message_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, DatabaseError> {
        let mut t = self.tables.write().await;
        let Some(message) = t.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if !message.read {
            message.read = true;
            message.read_at = Some(at);
        }
        Ok(Some(message.clone()))
    }

    async fn list_conversation(&self, a: Uuid, b: Uuid, page: Page) -> Result<Vec<Message>, DatabaseError> {
        let t = self.tables.read().await;
        let mut messages: Vec<Message> = t.messages.iter().filter(|m| m.between(a, b)).cloned().collect();
        messages.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        Ok(page.slice(messages))
    }

    async fn list_inbox(&self, recipient_id: Uuid, unread_only: bool, page: Page) -> Result<Vec<Message>, DatabaseError> {
        let t = self.tables.read().await;
        let mut messages: Vec<Message> = t
            .messages
            .iter()
            .filter(|m| m.recipient_id == recipient_id && (!unread_only || !m.read))
            .cloned()
            .collect();
        messages.sort_by(|x, y| y.created_at.cmp(&x.created_at));
        Ok(page.slice(messages))
    }

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), DatabaseError> {
        let mut t = self.tables.write().await;
        t.require_profile(endorsement.endorser_id)?;
        if !t.skills.iter().any(|s| s.id == endorsement.skill_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!("skill {}", endorsement.skill_id)));
        }
        if t
            .endorsements
            .iter()
            .any(|e| e.endorser_id == endorsement.endorser_id && e.skill_id == endorsement.skill_id)
        {
            return Err(DatabaseError::UniqueViolation("endorsements_endorser_skill_key".to_string()));
        }
        t.endorsements.push(endorsement.clone());
        Ok(())
    }

    async fn get_endorsement(&self, id: Uuid) -> Result<Option<Endorsement>, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.endorsements.iter().find(|e| e.id == id).cloned())
    }

    async fn delete_endorsement(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut t = self.tables.write().await;
        let before = t.endorsements.len();
        t.endorsements.retain(|e| e.id != id);
        Ok(t.endorsements.len() != before)
    }

    async fn list_endorsements(&self, filter: &EndorsementFilter, page: Page) -> Result<Vec<Endorsement>, DatabaseError> {
        let t = self.tables.read().await;
        let mut endorsements: Vec<Endorsement> = t.endorsements.iter().filter(|e| filter.matches(e)).cloned().collect();
        endorsements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.slice(endorsements))
    }

    async fn count_endorsements(&self, skill_id: Uuid) -> Result<i64, DatabaseError> {
        let t = self.tables.read().await;
        Ok(t.endorsements.iter().filter(|e| e.skill_id == skill_id).count() as i64)
    }
}
