// handlers/protected/profiles.rs - /api/profiles handlers

use axum::extract::State;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Profile;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::profiles::ProfileChanges;

/// GET /api/profiles - List profiles (public)
pub async fn profiles_list(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Profile>> {
    let profiles = state.profiles().list(page.page()).await?;
    Ok(ApiResponse::success(profiles))
}

/// GET /api/profiles/:id - Show a profile (public)
pub async fn profile_get(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Profile> {
    let identity = user.map(|AuthUser(identity)| identity);
    let profile = state.profiles().get(identity.as_ref(), id).await?;
    Ok(ApiResponse::success(profile))
}

/// PATCH /api/profiles/:id - Partial update by the owner
///
/// Absent fields are unchanged; `null` clears optional fields.
pub async fn profile_patch(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(changes): ApiJson<ProfileChanges>,
) -> ApiResult<Profile> {
    let profile = state.profiles().update(&identity, id, changes).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profiles/:id - Close the account and everything it owns
pub async fn profile_delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.profiles().delete(&identity, id).await?;
    Ok(ApiResponse::no_content())
}
