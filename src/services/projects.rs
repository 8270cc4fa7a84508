use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Project;
use crate::database::{Page, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::{nullable, validate, ServiceError};

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub profile: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectChanges {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub github_url: Option<Option<String>>,
    pub technologies: Option<Vec<String>>,
}

/// Trim tags, drop blanks and case-insensitive duplicates, keep first-seen order
pub fn normalize_technologies(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, profile_id: Option<Uuid>, page: Page) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list_projects(profile_id, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, ServiceError> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))
    }

    pub async fn create(&self, actor: &Identity, input: NewProject) -> Result<Project, ServiceError> {
        let mut project = Project::new(
            input.profile.unwrap_or(actor.id),
            validate::required_text("title", &input.title)?,
        );
        authorize(Some(actor), Action::Create, &Resource::from(&project))?;

        project.description = validate::optional_text(input.description);
        project.image_url = validate::optional_url("image_url", input.image_url)?;
        project.project_url = validate::optional_url("project_url", input.project_url)?;
        project.github_url = validate::optional_url("github_url", input.github_url)?;
        project.technologies = normalize_technologies(input.technologies);

        self.store.insert_project(&project).await?;
        tracing::info!("Project '{}' added by '{}'", project.title, actor.username);
        Ok(project)
    }

    pub async fn update(&self, actor: &Identity, id: Uuid, changes: ProjectChanges) -> Result<Project, ServiceError> {
        let mut project = self.get(id).await?;
        authorize(Some(actor), Action::Update, &Resource::from(&project))?;

        if let Some(title) = changes.title {
            project.title = validate::required_text("title", &title)?;
        }
        if let Some(v) = changes.description {
            project.description = validate::optional_text(v);
        }
        if let Some(v) = changes.image_url {
            project.image_url = validate::optional_url("image_url", v)?;
        }
        if let Some(v) = changes.project_url {
            project.project_url = validate::optional_url("project_url", v)?;
        }
        if let Some(v) = changes.github_url {
            project.github_url = validate::optional_url("github_url", v)?;
        }
        if let Some(tags) = changes.technologies {
            project.technologies = normalize_technologies(tags);
        }
        project.updated_at = Utc::now();

        self.store.update_project(&project).await?;
        Ok(project)
    }

    pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        let project = self.get(id).await?;
        authorize(Some(actor), Action::Delete, &Resource::from(&project))?;

        if !self.store.delete_project(id).await? {
            return Err(ServiceError::not_found("Project"));
        }
        Ok(())
    }
}
