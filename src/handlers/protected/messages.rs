// handlers/protected/messages.rs - /api/messages and /api/conversations handlers

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{AppState, PageQuery};
use crate::database::models::Message;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient: Uuid,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

/// GET /api/messages - The caller's inbox, newest first (`?unread=true` to filter)
pub async fn messages_list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiQuery(query): ApiQuery<InboxQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Message>> {
    let messages = state.messages().inbox(&identity, query.unread, page.page()).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /api/messages - `{"recipient": "<profile uuid>", "body": "..."}`
pub async fn message_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(payload): ApiJson<SendRequest>,
) -> ApiResult<Message> {
    let message = state.messages().send(&identity, payload.recipient, &payload.body).await?;
    Ok(ApiResponse::created(message))
}

/// GET /api/messages/:id - Sender or recipient only
pub async fn message_get(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Message> {
    Ok(ApiResponse::success(state.messages().get(&identity, id).await?))
}

/// POST /api/messages/:id/read - Recipient only, idempotent
pub async fn message_read(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Message> {
    Ok(ApiResponse::success(state.messages().mark_read(&identity, id).await?))
}

/// GET /api/conversations/:profile_id - Messages with another profile, oldest first
pub async fn conversation_get(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiPath(other): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Vec<Message>> {
    let messages = state
        .messages()
        .conversation(&identity, identity.id, other, page.page())
        .await?;
    Ok(ApiResponse::success(messages))
}
