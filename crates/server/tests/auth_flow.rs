mod common;

use axum::http::StatusCode;
use common::TestApp;
use models::user::Role;
use serde_json::json;

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn register_obtain_refresh_verify() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, created) = app
        .post("/api/v1/users", None, json!({"username": "maria", "email": "maria@example.com", "password": "S3curePass!"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "citizen");
    assert!(created.get("password").is_none());

    let (status, body) = app
        .post("/api/v1/auth/token", None, json!({"username": "maria", "password": "wrong-pass"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, pair) = app
        .post("/api/v1/auth/token", None, json!({"username": "maria", "password": "S3curePass!"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let access = pair["access"].as_str().unwrap_or_default().to_string();
    let refresh = pair["refresh"].as_str().unwrap_or_default().to_string();
    assert!(!access.is_empty() && !refresh.is_empty());

    let (status, _) = app.get("/api/v1/users", Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, renewed) = app.post("/api/v1/auth/token/refresh", None, json!({"refresh": refresh})).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(renewed["access"].is_string());

    // access token is not accepted as a refresh token
    let (status, _) = app.post("/api/v1/auth/token/refresh", None, json!({"refresh": access})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/v1/auth/token/verify", None, json!({"token": access})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/api/v1/auth/token/verify", None, json!({"token": "garbage"})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bad_bearer_is_rejected_missing_bearer_is_anonymous() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/api/v1/users", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, _) = app.get("/api/v1/services", Some("not-a-token")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/services", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn token_of_deleted_user_stops_working() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (ana, token) = app.user("ana", Role::Citizen).await?;

    let (status, _) = app.call("DELETE", &format!("/api/v1/users/{}", ana.id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/appointments", Some(&token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (status, body) = app.post("/api/v1/auth/token", None, json!({"username": "x"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_object());
    Ok(())
}
