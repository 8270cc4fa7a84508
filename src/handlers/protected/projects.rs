// handlers/protected/projects.rs - /api/projects handlers

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Project;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::projects::{NewProject, ProjectChanges};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub profile: Option<Uuid>,
}

/// GET /api/projects - List projects, optionally for one profile (public)
pub async fn projects_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Project>> {
    let projects = state.projects().list(query.profile, page.page()).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/:id - Show a project (public)
pub async fn project_get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Project> {
    Ok(ApiResponse::success(state.projects().get(id).await?))
}

/// POST /api/projects - Add a project to the caller's profile
pub async fn project_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(payload): ApiJson<NewProject>,
) -> ApiResult<Project> {
    let project = state.projects().create(&identity, payload).await?;
    Ok(ApiResponse::created(project))
}

/// PATCH /api/projects/:id
pub async fn project_patch(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(changes): ApiJson<ProjectChanges>,
) -> ApiResult<Project> {
    let project = state.projects().update(&identity, id, changes).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn project_delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.projects().delete(&identity, id).await?;
    Ok(ApiResponse::no_content())
}
