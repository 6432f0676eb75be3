// ==============================
// tests/integration/session_tests.rs
// ==============================
//! Session guard behaviour seen through the HTTP surface
use std::time::Duration;

use axum::http::StatusCode;
use backend_lib::auth::{sweep_expired, TokenIssuer};
use chrono::{Duration as ChronoDuration, Utc};
use kodbank_common::{Role, UserSummary};

use crate::test_utils::{setup_test_app, COOKIE_NAME};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn alice(uid: i64) -> UserSummary {
    UserSummary {
        uid,
        username: "alice".to_string(),
        email: "alice@x.com".to_string(),
        role: Role::Customer,
    }
}

fn token_of(cookie: &str) -> &str {
    cookie
        .strip_prefix(&format!("{COOKIE_NAME}="))
        .unwrap()
}

#[tokio::test]
async fn test_missing_and_empty_cookie_are_rejected() {
    let app = setup_test_app().await;

    for cookie in [None, Some("authToken="), Some("otherCookie=abc")] {
        let response = app.get("/balance/check", cookie).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json()["authenticated"], false);
        assert_eq!(response.json()["error"], "Not authenticated");
    }
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = setup_test_app().await;
    let (cookie, _) = app.signed_in("alice", "alice@x.com").await;

    // Flip one character of the payload segment
    let token = token_of(&cookie);
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let payload = &mut parts[1];
    let last = payload.pop().unwrap();
    payload.push(if last == 'A' { 'B' } else { 'A' });
    let tampered = format!("{COOKIE_NAME}={}", parts.join("."));

    let response = app.get("/auth/check", Some(&tampered)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_signature_is_rejected_even_when_recorded() {
    let app = setup_test_app().await;
    let (_, uid) = app.signed_in("alice", "alice@x.com").await;

    let forger = TokenIssuer::new("attacker-secret", DAY).unwrap();
    let forged = forger.issue(&alice(uid)).unwrap();
    app.state
        .ledger
        .save(&forged.token, uid, forged.expires_at)
        .await
        .unwrap();

    let cookie = format!("{COOKIE_NAME}={}", forged.token);
    let response = app.get("/auth/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected_despite_live_ledger_row() {
    let app = setup_test_app().await;
    let (_, uid) = app.signed_in("alice", "alice@x.com").await;

    let issuer = TokenIssuer::new("test-secret", DAY).unwrap();
    let stale = issuer
        .issue_at(&alice(uid), Utc::now() - ChronoDuration::days(2))
        .unwrap();
    assert!(issuer.verify(&stale.token).is_err());

    // Ledger not yet cleaned up
    app.state
        .ledger
        .save(&stale.token, uid, Utc::now() + ChronoDuration::hours(1))
        .await
        .unwrap();

    let cookie = format!("{COOKIE_NAME}={}", stale.token);
    let response = app.get("/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ledger_expiry_rejects_signature_valid_token() {
    let app = setup_test_app().await;
    let (_, uid) = app.signed_in("alice", "alice@x.com").await;

    let issuer = TokenIssuer::new("test-secret", DAY).unwrap();
    let issued = issuer.issue(&alice(uid)).unwrap();
    app.state
        .ledger
        .save(&issued.token, uid, Utc::now() - ChronoDuration::seconds(1))
        .await
        .unwrap();

    let cookie = format!("{COOKIE_NAME}={}", issued.token);
    let response = app.get("/balance/check", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // The reaper only tidies up; the decision above did not depend on it
    assert_eq!(sweep_expired(app.state.ledger.as_ref()).await, 1);
    assert!(app
        .state
        .ledger
        .find_by_token(&issued.token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_revoked_token_still_verifies_but_is_rejected() {
    let app = setup_test_app().await;
    let (cookie, _) = app.signed_in("alice", "alice@x.com").await;
    let token = token_of(&cookie).to_string();

    app.logout(Some(&cookie)).await;

    let issuer = TokenIssuer::new("test-secret", DAY).unwrap();
    assert!(issuer.verify(&token).is_ok());

    let response = app.get("/auth/profile", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoking_all_sessions_of_a_user() {
    let app = setup_test_app().await;
    let (first, uid) = app.signed_in("alice", "alice@x.com").await;
    let second = app
        .login("alice", "secret1")
        .await
        .session_cookie()
        .unwrap();

    assert_eq!(app.state.ledger.delete_all_for_user(uid).await.unwrap(), 2);

    for cookie in [first, second] {
        assert_eq!(
            app.get("/auth/check", Some(&cookie)).await.status,
            StatusCode::UNAUTHORIZED
        );
    }
}
