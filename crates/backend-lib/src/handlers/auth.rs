// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login, logout and session introspection.
use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use kodbank_common::{
    CheckAuthResponse, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RegisterRequest,
};

use crate::auth::{clearing_cookie, session_cookie, session_token, AuthContext};
use crate::{error::AppError, AppState};

/// `POST /auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload?;
    state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful. Please login to continue.")),
    ))
}

/// `POST /auth/login`: sets the session cookie on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let Json(request) = payload?;
    let outcome = state.auth.login(request).await?;

    let jar = jar.add(session_cookie(&state.cookies, outcome.token.token));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            user: outcome.user,
        }),
    ))
}

/// `POST /auth/logout`: idempotent, succeeds with or without a session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let credential = session_token(&jar, &state.cookies);
    state.auth.logout(credential.as_deref()).await?;

    let jar = jar.add(clearing_cookie(&state.cookies));
    Ok((jar, Json(MessageResponse::new("Logout successful"))))
}

/// `GET /auth/profile`
pub async fn profile(
    State(state): State<Arc<AppState>>,
    context: AuthContext,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state.auth.profile(&context).await?;
    Ok(Json(ProfileResponse {
        uid: user.uid,
        balance: user.balance(),
        username: user.username,
        email: user.email,
        phone: user.phone,
        role: user.role,
    }))
}

/// `GET /auth/check`
pub async fn check(
    State(state): State<Arc<AppState>>,
    context: AuthContext,
) -> Result<Json<CheckAuthResponse>, AppError> {
    let user = state.auth.check_auth(&context).await?;
    Ok(Json(CheckAuthResponse {
        success: true,
        authenticated: true,
        user,
    }))
}
