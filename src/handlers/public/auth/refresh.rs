// handlers/public/auth/refresh.rs - POST /api/token/refresh handler

use axum::extract::State;
use serde::Deserialize;

use crate::api::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::accounts::AccessToken;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// POST /api/token/refresh - Issue a new access token from a refresh token
pub async fn refresh_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<AccessToken> {
    let access = state.accounts().refresh(&payload.refresh).await?;
    Ok(ApiResponse::success(access))
}
