mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{send, TestServer};

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = send(server.get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(server.get("/")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Blitz API");
    Ok(())
}

#[tokio::test]
async fn register_login_refresh_whoami() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;

    let (status, body) = send(
        server
            .post("/api/token")
            .json(&json!({ "username": "alice", "password": "correct horse battery" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access"].is_string());
    assert!(body["data"]["refresh"].is_string());

    let (status, body) = send(server.post("/api/token/refresh").json(&json!({ "refresh": alice.refresh }))).await?;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(server.get("/api/auth/whoami").bearer_auth(&access)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert_eq!(body["data"]["profile"]["id"], alice.id.as_str());
    assert!(body["data"]["user"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("alice").await?;

    let (status, body) = send(
        server
            .post("/api/token")
            .json(&json!({ "username": "alice", "password": "not the password" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "No active account found with the given credentials");
    Ok(())
}

#[tokio::test]
async fn duplicate_username_conflicts() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("alice").await?;

    let (status, body) = send(server.post("/api/auth/register").json(&json!({
        "username": "alice",
        "password": "another password",
        "email": "other@example.com",
    })))
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn registration_is_validated() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = send(server.post("/api/auth/register").json(&json!({
        "username": "al",
        "password": "correct horse battery",
        "email": "al@example.com",
    })))
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["username"].is_string());

    let (status, body) = send(
        server
            .post("/api/auth/register")
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn token_types_are_not_interchangeable() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("alice").await?;

    let (status, _) = send(server.get("/api/auth/whoami").bearer_auth(&alice.refresh)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(server.post("/api/token/refresh").json(&json!({ "refresh": alice.access }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/api/auth/whoami", "/api/connections", "/api/messages"] {
        let (status, body) = send(server.get(path)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(server.get("/api/auth/whoami").bearer_auth("garbage")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
