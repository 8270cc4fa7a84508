// handlers/public/root.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::AppState;

/// GET / - Service name, version and endpoint map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Blitz API",
            "version": version,
            "description": "Developer networking backend: profiles, skills, projects, connections, messages, endorsements",
            "endpoints": {
                "auth": "/api/auth/register, /api/token, /api/token/refresh (public), /api/auth/whoami",
                "profiles": "/api/profiles[/:id]",
                "skills": "/api/skills[/:id]",
                "projects": "/api/projects[/:id]",
                "connections": "/api/connections[/:id[/respond]], /api/connections/requests",
                "messages": "/api/messages[/:id[/read]], /api/conversations/:profile_id",
                "endorsements": "/api/endorsements[/:id]",
            }
        }
    }))
}

/// GET /health - Store connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
