use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::error::ApiError;
use crate::services::ServiceError;
use crate::types::Identity;

/// Authenticated caller resolved from a bearer access token.
///
/// Handlers that require a caller take `AuthUser`; handlers for public reads
/// take `Option<AuthUser>`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::unauthenticated().into())
    }
}

/// JWT authentication middleware.
///
/// A request without an `Authorization` header continues anonymously. A
/// header that is present must carry a valid access token for an existing
/// identity, otherwise the request is rejected with 401.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_jwt_from_headers(request.headers())? {
        let identity = state.accounts().authenticate(&token).await?;
        request.extensions_mut().insert(AuthUser(identity));
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token, if any, from the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err(ApiError::unauthorized("Empty JWT token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
