// handlers/protected/endorsements.rs - /api/endorsements handlers

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Endorsement;
use crate::database::EndorsementFilter;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct EndorseRequest {
    pub skill: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndorsementQuery {
    pub skill: Option<Uuid>,
    /// Endorsee profile
    pub profile: Option<Uuid>,
    pub endorser: Option<Uuid>,
}

/// GET /api/endorsements - Public listing, `?skill=`, `?profile=` or `?endorser=`
pub async fn endorsements_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EndorsementQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Endorsement>> {
    let filter = EndorsementFilter {
        skill_id: query.skill,
        endorsee_id: query.profile,
        endorser_id: query.endorser,
    };
    let endorsements = state.endorsements().list(&filter, page.page()).await?;
    Ok(ApiResponse::success(endorsements))
}

/// POST /api/endorsements - `{"skill": "<skill uuid>"}`; the endorsee is the skill owner
pub async fn endorsement_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(payload): ApiJson<EndorseRequest>,
) -> ApiResult<Endorsement> {
    let endorsement = state.endorsements().endorse(&identity, payload.skill).await?;
    Ok(ApiResponse::created(endorsement))
}

/// GET /api/endorsements/:id (public)
pub async fn endorsement_get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Endorsement> {
    Ok(ApiResponse::success(state.endorsements().get(id).await?))
}

/// DELETE /api/endorsements/:id - Withdraw, endorser only
pub async fn endorsement_delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.endorsements().withdraw(&identity, id).await?;
    Ok(ApiResponse::no_content())
}
