// handlers/protected/connections.rs - /api/connections handlers
//
// All connection routes require an authenticated caller.

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Connection;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::connections::Decision;

#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    pub target: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub decision: Decision,
}

/// GET /api/connections - The caller's accepted connections, latest first
pub async fn connections_list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Connection>> {
    let connections = state.connections().list(&identity, page.page()).await?;
    Ok(ApiResponse::success(connections))
}

/// GET /api/connections/requests - Pending requests sent or received
pub async fn connection_requests(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Connection>> {
    let pending = state.connections().requests(&identity, page.page()).await?;
    Ok(ApiResponse::success(pending))
}

/// POST /api/connections - Propose a connection: `{"target": "<profile uuid>"}`
pub async fn connection_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(payload): ApiJson<ProposeRequest>,
) -> ApiResult<Connection> {
    let connection = state.connections().propose(&identity, payload.target).await?;
    Ok(ApiResponse::created(connection))
}

/// GET /api/connections/:id - Either party only
pub async fn connection_get(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Connection> {
    Ok(ApiResponse::success(state.connections().get(&identity, id).await?))
}

/// POST /api/connections/:id/respond - `{"decision": "accept" | "reject"}`, target only
pub async fn connection_respond(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RespondRequest>,
) -> ApiResult<Connection> {
    let connection = state.connections().respond(&identity, id, payload.decision).await?;
    Ok(ApiResponse::success(connection))
}

/// DELETE /api/connections/:id - Revoke an accepted connection
pub async fn connection_delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.connections().revoke(&identity, id).await?;
    Ok(ApiResponse::no_content())
}
