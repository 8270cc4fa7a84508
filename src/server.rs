use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::AppState;
use crate::config;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Build the full router over the given state
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(skill_routes())
        .merge(project_routes())
        .merge(connection_routes())
        .merge(message_routes())
        .merge(endorsement_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Protected API
        .merge(api)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(config::config().api.max_request_size_bytes)),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Blitz API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().security.cors_origins;
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(origins)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/token", post(auth::token_post))
        .route("/api/token/refresh", post(auth::refresh_post))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami_get))
}

fn profile_routes() -> Router<AppState> {
    use protected::profiles;

    Router::new()
        .route("/api/profiles", get(profiles::profiles_list))
        .route(
            "/api/profiles/:id",
            get(profiles::profile_get)
                .patch(profiles::profile_patch)
                .delete(profiles::profile_delete),
        )
}

fn skill_routes() -> Router<AppState> {
    use protected::skills;

    Router::new()
        .route("/api/skills", get(skills::skills_list).post(skills::skill_post))
        .route(
            "/api/skills/:id",
            get(skills::skill_get)
                .patch(skills::skill_patch)
                .delete(skills::skill_delete),
        )
}

fn project_routes() -> Router<AppState> {
    use protected::projects;

    Router::new()
        .route("/api/projects", get(projects::projects_list).post(projects::project_post))
        .route(
            "/api/projects/:id",
            get(projects::project_get)
                .patch(projects::project_patch)
                .delete(projects::project_delete),
        )
}

fn connection_routes() -> Router<AppState> {
    use protected::connections;

    Router::new()
        .route(
            "/api/connections",
            get(connections::connections_list).post(connections::connection_post),
        )
        .route("/api/connections/requests", get(connections::connection_requests))
        .route(
            "/api/connections/:id",
            get(connections::connection_get).delete(connections::connection_delete),
        )
        .route("/api/connections/:id/respond", post(connections::connection_respond))
}

fn message_routes() -> Router<AppState> {
    use protected::messages;

    Router::new()
        .route("/api/messages", get(messages::messages_list).post(messages::message_post))
        .route("/api/messages/:id", get(messages::message_get))
        .route("/api/messages/:id/read", post(messages::message_read))
        .route("/api/conversations/:profile_id", get(messages::conversation_get))
}

fn endorsement_routes() -> Router<AppState> {
    use protected::endorsements;

    Router::new()
        .route(
            "/api/endorsements",
            get(endorsements::endorsements_list).post(endorsements::endorsement_post),
        )
        .route(
            "/api/endorsements/:id",
            get(endorsements::endorsement_get).delete(endorsements::endorsement_delete),
        )
}
