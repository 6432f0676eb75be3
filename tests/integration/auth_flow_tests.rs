// ==============================
// tests/integration/auth_flow_tests.rs
// ==============================
//! End-to-end registration, login, logout and account access
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use backend_lib::storage::UserStore;
use serde_json::json;

use crate::test_utils::{registration, setup_test_app};

#[tokio::test]
async fn test_register_login_balance_logout_scenario() {
    let app = setup_test_app().await;

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1",
                "confirmPassword": "secret1",
                "phone": "5551234",
            }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        response.json()["message"],
        "Registration successful. Please login to continue."
    );
    // No session at registration
    assert!(response.session_cookie().is_none());

    let response = app.login("alice", "secret1").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert_eq!(body["user"]["role"], "Customer");
    assert!(body["user"]["uid"].is_i64());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    let cookie = response.session_cookie().unwrap();

    let response = app.get("/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["balance"].is_number());

    let response = app.logout(Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Logout successful");

    let response = app.get("/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_failed_login_bodies_are_identical() {
    let app = setup_test_app().await;
    app.register("alice", "alice@x.com", "secret1").await;

    let wrong_password = app.login("alice", "wrong").await;
    let unknown_user = app.login("nobody", "wrong").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(
        wrong_password.json()["error"],
        "Invalid username or password"
    );
    assert!(wrong_password.session_cookie().is_none());
    assert!(unknown_user.session_cookie().is_none());
}

#[tokio::test]
async fn test_register_validation_messages() {
    let app = setup_test_app().await;

    let mut missing_phone = registration("alice", "alice@x.com", "secret1");
    missing_phone["phone"] = json!("");
    let mut blank_username = registration("alice", "alice@x.com", "secret1");
    blank_username["username"] = json!("   ");
    let mut mismatch = registration("alice", "alice@x.com", "secret1");
    mismatch["confirmPassword"] = json!("secret2");

    let cases = [
        (missing_phone, "All fields are required"),
        (blank_username, "All fields are required"),
        (json!({ "username": "alice" }), "All fields are required"),
        (mismatch, "Passwords do not match"),
        (
            registration("alice", "alice@x.com", "abc12"),
            "Password must be at least 6 characters",
        ),
    ];

    for (body, expected) in cases {
        let response = app.post_json("/auth/register", body, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(response.json()["error"], expected);
        assert_eq!(response.json()["code"], "VAL_001");
    }

    assert!(!app.db.users().username_exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_and_email_conflict() {
    let app = setup_test_app().await;
    assert_eq!(
        app.register("alice", "alice@x.com", "secret1").await.status,
        StatusCode::CREATED
    );

    let response = app.register("alice", "other@x.com", "secret1").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "Username already exists");

    let response = app.register("alice2", "alice@x.com", "secret1").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "Email already registered");

    // Neither rejected registration created a user
    let users = app.db.users();
    assert!(!users.username_exists("alice2").await.unwrap());
    assert!(!users.email_exists("other@x.com").await.unwrap());
    assert_eq!(
        app.login("alice2", "secret1").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_login_requires_username_and_password() {
    let app = setup_test_app().await;

    for body in [
        json!({}),
        json!({ "username": "alice" }),
        json!({ "password": "secret1" }),
        json!({ "username": "  ", "password": "secret1" }),
    ] {
        let response = app.post_json("/auth/login", body, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json()["error"],
            "Username and password are required"
        );
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "VAL_001");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .body(Body::from("username=alice&password=secret1"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_cookie_attributes() {
    let app = setup_test_app().await;
    app.register("alice", "alice@x.com", "secret1").await;

    let response = app.login("alice", "secret1").await;
    let set_cookie = response.session_set_cookies().pop().unwrap();

    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=86400"));
    // Development settings: plain HTTP
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = setup_test_app().await;
    let (cookie, _) = app.signed_in("alice", "alice@x.com").await;

    let first = app.logout(Some(&cookie)).await;
    assert_eq!(first.status, StatusCode::OK);
    let cleared = first.session_set_cookies().pop().unwrap();
    assert!(cleared.starts_with("authToken=;"));
    assert!(cleared.contains("Max-Age=0"));

    let second = app.logout(Some(&cookie)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.json()["message"], "Logout successful");

    let anonymous = app.logout(None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
}

#[tokio::test]
async fn test_check_auth() {
    let app = setup_test_app().await;
    let (cookie, uid) = app.signed_in("alice", "alice@x.com").await;

    let response = app.get("/auth/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["uid"], uid);
    assert_eq!(body["user"]["username"], "alice");

    let response = app.get("/auth/check", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["authenticated"], false);

    app.logout(Some(&cookie)).await;
    let response = app.get("/auth/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["authenticated"], false);
}

#[tokio::test]
async fn test_profile_returns_public_fields() {
    let app = setup_test_app().await;
    let (cookie, uid) = app.signed_in("alice", "alice@x.com").await;

    let response = app.get("/auth/profile", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["uid"], uid);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["phone"], "5551234");
    assert_eq!(body["role"], "Customer");
    assert_eq!(body["balance"].as_f64(), Some(100_000.0));
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    assert_eq!(
        app.get("/auth/profile", None).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_balance_response() {
    let app = setup_test_app().await;
    let (cookie, _) = app.signed_in("alice", "alice@x.com").await;

    let response = app.get("/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["balance"].as_f64(), Some(100_000.0));
    assert_eq!(body["currency"], "₹");
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let app = setup_test_app().await;
    let (first, _) = app.signed_in("alice", "alice@x.com").await;
    let second = app
        .login("alice", "secret1")
        .await
        .session_cookie()
        .unwrap();
    assert_ne!(first, second);

    app.logout(Some(&first)).await;

    assert_eq!(
        app.get("/auth/check", Some(&first)).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get("/auth/check", Some(&second)).await.status,
        StatusCode::OK
    );
}
