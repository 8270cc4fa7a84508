// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::extract::State;

use crate::api::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::accounts::WhoAmI;

/// GET /api/auth/whoami - The authenticated identity and its profile
pub async fn whoami_get(State(state): State<AppState>, AuthUser(identity): AuthUser) -> ApiResult<WhoAmI> {
    let me = state.accounts().whoami(&identity).await?;
    Ok(ApiResponse::success(me))
}
