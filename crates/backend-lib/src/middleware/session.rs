// crates/backend-lib/src/middleware/session.rs

//! Session guard middleware and the `AuthContext` extractor.
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{session_token, AuthContext, Rejection};
use crate::{error::AppError, AppState};

/// Reject requests without a live session; otherwise attach the
/// caller's [`AuthContext`] to the request.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let credential = session_token(&jar, &state.cookies);

    let context = state.guard.authenticate(credential.as_deref()).await?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present behind `require_session`
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthenticated(Rejection::MissingCredential))
    }
}
