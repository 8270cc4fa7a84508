// handlers/public/auth/token.rs - POST /api/token handler

use axum::extract::State;
use serde::Deserialize;

use crate::api::AppState;
use crate::auth::TokenPair;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/token - Exchange credentials for an access/refresh token pair
pub async fn token_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> ApiResult<TokenPair> {
    let pair = state.accounts().login(&payload.username, &payload.password).await?;
    Ok(ApiResponse::success(pair))
}
