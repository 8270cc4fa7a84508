// handlers/protected/skills.rs - /api/skills handlers

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Proficiency;
use crate::database::SkillFilter;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::skills::{NewSkill, SkillChanges, SkillView};

#[derive(Debug, Default, Deserialize)]
pub struct SkillQuery {
    pub profile: Option<Uuid>,
    pub min_proficiency: Option<Proficiency>,
}

/// GET /api/skills - List skills with endorsement counts (public)
///
/// Filters: `?profile=<uuid>&min_proficiency=advanced`
pub async fn skills_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SkillQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<SkillView>> {
    let filter = SkillFilter {
        profile_id: query.profile,
        min_proficiency: query.min_proficiency,
    };
    let skills = state.skills().list(&filter, page.page()).await?;
    Ok(ApiResponse::success(skills))
}

/// GET /api/skills/:id - Show a skill (public)
pub async fn skill_get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<SkillView> {
    Ok(ApiResponse::success(state.skills().get(id).await?))
}

/// POST /api/skills - Add a skill to the caller's profile
pub async fn skill_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(payload): ApiJson<NewSkill>,
) -> ApiResult<SkillView> {
    let skill = state.skills().create(&identity, payload).await?;
    Ok(ApiResponse::created(skill))
}

/// PATCH /api/skills/:id - Rename or re-level a skill
pub async fn skill_patch(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(changes): ApiJson<SkillChanges>,
) -> ApiResult<SkillView> {
    let skill = state.skills().update(&identity, id, changes).await?;
    Ok(ApiResponse::success(skill))
}

/// DELETE /api/skills/:id - Remove a skill and its endorsements
pub async fn skill_delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.skills().delete(&identity, id).await?;
    Ok(ApiResponse::no_content())
}
