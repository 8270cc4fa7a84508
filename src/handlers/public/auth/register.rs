// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;

use crate::api::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::accounts::{Registered, Registration};

/// POST /api/auth/register - Create an account and its profile
///
/// Expected Input:
/// ```json
/// {
///   "username": "alice",
///   "password": "at least 8 chars",
///   "email": "alice@example.com",
///   "full_name": "Alice Liddell"
/// }
/// ```
///
/// Responds 201 with the new profile plus `access` and `refresh` tokens.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Registration>,
) -> ApiResult<Registered> {
    let registered = state.accounts().register(payload).await?;
    Ok(ApiResponse::created(registered))
}
