use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Connection, ConnectionStatus, Endorsement, Message, Profile, Project, Skill, User};
use super::store::{EndorsementFilter, Page, SkillFilter, Store};

const PROFILE_COLUMNS: &str = "id, email, full_name, bio, avatar_url, location, website, github_url, \
     linkedin_url, twitter_url, years_experience, open_to_work, created_at, updated_at";
const SKILL_COLUMNS: &str = "id, profile_id, name, proficiency, created_at";
const PROJECT_COLUMNS: &str = "id, profile_id, title, description, image_url, project_url, github_url, \
     technologies, created_at, updated_at";
const CONNECTION_COLUMNS: &str = "id, initiator_id, target_id, status, created_at, responded_at";
const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, body, read, created_at, read_at";
const ENDORSEMENT_COLUMNS: &str = "id, endorser_id, endorsee_id, skill_id, created_at";

/// Postgres-backed store. Uniqueness and cascades are enforced by the schema
/// in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_account(&self, user: &User, profile: &Profile) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO profiles ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            PROFILE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(&profile.bio)
            .bind(&profile.avatar_url)
            .bind(&profile.location)
            .bind(&profile.website)
            .bind(&profile.github_url)
            .bind(&profile.linkedin_url)
            .bind(&profile.twitter_url)
            .bind(profile.years_experience)
            .bind(profile.open_to_work)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password_hash, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_profiles(&self, page: Page) -> Result<Vec<Profile>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM profiles ORDER BY created_at, id LIMIT $1 OFFSET $2",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                email = $2, full_name = $3, bio = $4, avatar_url = $5, location = $6,
                website = $7, github_url = $8, linkedin_url = $9, twitter_url = $10,
                years_experience = $11, open_to_work = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(&profile.github_url)
        .bind(&profile.linkedin_url)
        .bind(&profile.twitter_url)
        .bind(profile.years_experience)
        .bind(profile.open_to_work)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("profile {}", profile.id)));
        }
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, DatabaseError> {
        // profiles.id references users.id; every dependent table cascades from profiles
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_skill(&self, skill: &Skill) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO skills ({}) VALUES ($1, $2, $3, $4, $5)", SKILL_COLUMNS);
        sqlx::query(&sql)
            .bind(skill.id)
            .bind(skill.profile_id)
            .bind(&skill.name)
            .bind(skill.proficiency)
            .bind(skill.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_skill(&self, id: Uuid) -> Result<Option<Skill>, DatabaseError> {
        let sql = format!("SELECT {} FROM skills WHERE id = $1", SKILL_COLUMNS);
        Ok(sqlx::query_as::<_, Skill>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_skills(&self, filter: &SkillFilter, page: Page) -> Result<Vec<Skill>, DatabaseError> {
        // proficiency_level is an ordered enum, so >= follows declaration order
        let sql = format!(
            r#"
            SELECT {} FROM skills
            WHERE ($1::uuid IS NULL OR profile_id = $1)
              AND ($2::proficiency_level IS NULL OR proficiency >= $2)
            ORDER BY created_at, id
            LIMIT $3 OFFSET $4
            "#,
            SKILL_COLUMNS
        );
        Ok(sqlx::query_as::<_, Skill>(&sql)
            .bind(filter.profile_id)
            .bind(filter.min_proficiency)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_skill(&self, skill: &Skill) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE skills SET name = $2, proficiency = $3 WHERE id = $1")
            .bind(skill.id)
            .bind(&skill.name)
            .bind(skill.proficiency)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("skill {}", skill.id)));
        }
        Ok(())
    }

    async fn delete_skill(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let sql = format!(
            "INSERT INTO projects ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            PROJECT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(project.id)
            .bind(project.profile_id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.image_url)
            .bind(&project.project_url)
            .bind(&project.github_url)
            .bind(&project.technologies)
            .bind(project.created_at)
            .bind(project.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        Ok(sqlx::query_as::<_, Project>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_projects(&self, profile_id: Option<Uuid>, page: Page) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM projects
            WHERE ($1::uuid IS NULL OR profile_id = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            PROJECT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(profile_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = $2, description = $3, image_url = $4, project_url = $5,
                github_url = $6, technologies = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.project_url)
        .bind(&project.github_url)
        .bind(&project.technologies)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("project {}", project.id)));
        }
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_connection(&self, connection: &Connection) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO connections ({}) VALUES ($1, $2, $3, $4, $5, $6)", CONNECTION_COLUMNS);
        sqlx::query(&sql)
            .bind(connection.id)
            .bind(connection.initiator_id)
            .bind(connection.target_id)
            .bind(connection.status)
            .bind(connection.created_at)
            .bind(connection.responded_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_connection(&self, id: Uuid) -> Result<Option<Connection>, DatabaseError> {
        let sql = format!("SELECT {} FROM connections WHERE id = $1", CONNECTION_COLUMNS);
        Ok(sqlx::query_as::<_, Connection>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_connection_between(&self, a: Uuid, b: Uuid) -> Result<Option<Connection>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM connections
            WHERE (initiator_id = $1 AND target_id = $2) OR (initiator_id = $2 AND target_id = $1)
            "#,
            CONNECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Connection>(&sql)
            .bind(a)
            .bind(b)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn reopen_connection(
        &self,
        id: Uuid,
        initiator: Uuid,
        target: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE connections
            SET initiator_id = $2, target_id = $3, status = 'pending', created_at = $4, responded_at = NULL
            WHERE id = $1 AND status = 'rejected'
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .bind(initiator)
            .bind(target)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn transition_connection(
        &self,
        id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Connection>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE connections SET status = $3, responded_at = $4
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_connection(&self, id: Uuid, expected: ConnectionStatus) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM connections WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_accepted_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM connections
            WHERE status = 'accepted' AND (initiator_id = $1 OR target_id = $1)
            ORDER BY responded_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            CONNECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Connection>(&sql)
            .bind(profile_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_pending_connections(&self, profile_id: Uuid, page: Page) -> Result<Vec<Connection>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM connections
            WHERE status = 'pending' AND (initiator_id = $1 OR target_id = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            CONNECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Connection>(&sql)
            .bind(profile_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO messages ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)", MESSAGE_COLUMNS);
        sqlx::query(&sql)
            .bind(message.id)
            .bind(message.sender_id)
            .bind(message.recipient_id)
            .bind(&message.body)
            .bind(message.read)
            .bind(message.created_at)
            .bind(message.read_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, DatabaseError> {
        let sql = format!("SELECT {} FROM messages WHERE id = $1", MESSAGE_COLUMNS);
        Ok(sqlx::query_as::<_, Message>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn mark_message_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Message>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE messages SET read = true, read_at = COALESCE(read_at, $2)
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_conversation(&self, a: Uuid, b: Uuid, page: Page) -> Result<Vec<Message>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC, id
            LIMIT $3 OFFSET $4
            "#,
            MESSAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Message>(&sql)
            .bind(a)
            .bind(b)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_inbox(&self, recipient_id: Uuid, unread_only: bool, page: Page) -> Result<Vec<Message>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM messages
            WHERE recipient_id = $1 AND (NOT $2 OR read = false)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#,
            MESSAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Message>(&sql)
            .bind(recipient_id)
            .bind(unread_only)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO endorsements ({}) VALUES ($1, $2, $3, $4, $5)", ENDORSEMENT_COLUMNS);
        sqlx::query(&sql)
            .bind(endorsement.id)
            .bind(endorsement.endorser_id)
            .bind(endorsement.endorsee_id)
            .bind(endorsement.skill_id)
            .bind(endorsement.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_endorsement(&self, id: Uuid) -> Result<Option<Endorsement>, DatabaseError> {
        let sql = format!("SELECT {} FROM endorsements WHERE id = $1", ENDORSEMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Endorsement>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn delete_endorsement(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM endorsements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_endorsements(&self, filter: &EndorsementFilter, page: Page) -> Result<Vec<Endorsement>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM endorsements
            WHERE ($1::uuid IS NULL OR skill_id = $1)
              AND ($2::uuid IS NULL OR endorsee_id = $2)
              AND ($3::uuid IS NULL OR endorser_id = $3)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
            "#,
            ENDORSEMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Endorsement>(&sql)
            .bind(filter.skill_id)
            .bind(filter.endorsee_id)
            .bind(filter.endorser_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_endorsements(&self, skill_id: Uuid) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM endorsements WHERE skill_id = $1")
            .bind(skill_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
