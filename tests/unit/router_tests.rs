// ==============================
// tests/unit/router_tests.rs
// ==============================
//! Unit tests for route wiring
use axum::http::StatusCode;
use backend_lib::config::Environment;
use chrono::DateTime;

use crate::test_utils::{registration, setup_test_app, setup_test_app_with};

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "Backend is running");
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup_test_app().await;

    let response = app.get("/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "Route not found");
}

#[tokio::test]
async fn test_api_prefix_mounts_every_route() {
    let app = setup_test_app_with(|settings| {
        settings.api_prefix = "/api".to_string();
    })
    .await;

    assert_eq!(app.get("/api/health", None).await.status, StatusCode::OK);
    assert_eq!(app.get("/health", None).await.status, StatusCode::NOT_FOUND);

    let response = app
        .post_json(
            "/api/auth/register",
            registration("alice", "alice@x.com", "secret1"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .post_json(
            "/api/auth/login",
            serde_json::json!({ "username": "alice", "password": "secret1" }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.session_cookie().unwrap();

    let response = app.get("/api/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_production_cookie_is_secure() {
    let app = setup_test_app_with(|settings| {
        settings.environment = Environment::Production;
    })
    .await;
    app.register("alice", "alice@x.com", "secret1").await;

    let response = app.login("alice", "secret1").await;
    let set_cookie = response.session_set_cookies().pop().unwrap();
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("HttpOnly"));
}
