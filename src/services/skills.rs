use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Proficiency, Skill};
use crate::database::{DatabaseError, Page, SkillFilter, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::{validate, ServiceError};

/// A skill with its derived endorsement count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    #[serde(flatten)]
    pub skill: Skill,
    pub endorsement_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewSkill {
    /// Defaults to the actor's own profile
    pub profile: Option<Uuid>,
    pub name: String,
    pub proficiency: Proficiency,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillChanges {
    pub name: Option<String>,
    pub proficiency: Option<Proficiency>,
}

pub struct SkillService {
    store: Arc<dyn Store>,
}

impl SkillService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &SkillFilter, page: Page) -> Result<Vec<SkillView>, ServiceError> {
        let skills = self.store.list_skills(filter, page).await?;
        let mut views = Vec::with_capacity(skills.len());
        for skill in skills {
            views.push(self.view(skill).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<SkillView, ServiceError> {
        let skill = self.find(id).await?;
        self.view(skill).await
    }

    pub async fn create(&self, actor: &Identity, input: NewSkill) -> Result<SkillView, ServiceError> {
        let profile_id = input.profile.unwrap_or(actor.id);
        let skill = Skill::new(profile_id, validate::required_text("name", &input.name)?, input.proficiency);
        authorize(Some(actor), Action::Create, &Resource::from(&skill))?;

        self.store.insert_skill(&skill).await.map_err(duplicate_name)?;
        tracing::info!("Skill '{}' added by '{}'", skill.name, actor.username);
        Ok(SkillView {
            skill,
            endorsement_count: 0,
        })
    }

    pub async fn update(&self, actor: &Identity, id: Uuid, changes: SkillChanges) -> Result<SkillView, ServiceError> {
        let mut skill = self.find(id).await?;
        authorize(Some(actor), Action::Update, &Resource::from(&skill))?;

        if let Some(name) = changes.name {
            skill.name = validate::required_text("name", &name)?;
        }
        if let Some(proficiency) = changes.proficiency {
            skill.proficiency = proficiency;
        }
        self.store.update_skill(&skill).await.map_err(duplicate_name)?;
        self.view(skill).await
    }

    /// Delete a skill and the endorsements it received
    pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        let skill = self.find(id).await?;
        authorize(Some(actor), Action::Delete, &Resource::from(&skill))?;

        if !self.store.delete_skill(id).await? {
            return Err(ServiceError::not_found("Skill"));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Skill, ServiceError> {
        self.store
            .get_skill(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Skill"))
    }

    async fn view(&self, skill: Skill) -> Result<SkillView, ServiceError> {
        let endorsement_count = self.store.count_endorsements(skill.id).await?;
        Ok(SkillView {
            skill,
            endorsement_count,
        })
    }
}

fn duplicate_name(err: DatabaseError) -> ServiceError {
    match err {
        DatabaseError::UniqueViolation(_) => {
            ServiceError::Conflict("This profile already has a skill with that name".to_string())
        }
        other => other.into(),
    }
}
