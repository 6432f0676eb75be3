// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session guard: decides whether a request carries a live session.
//!
//! A credential passes only if the ledger holds an unexpired row for it
//! and its signature and expiry verify. The ledger is consulted first so
//! that revoked tokens are rejected before any cryptographic work.
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kodbank_common::{Role, UserId, UserSummary};
use metrics::counter;

use super::token::{Claims, TokenIssuer};
use crate::error::AppError;
use crate::metrics::SESSION_REJECTED;
use crate::storage::TokenLedger;

/// Why the guard refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No session cookie, or an empty one
    MissingCredential,
    /// No live ledger row: logged out, purged, or never issued
    ExpiredOrRevoked,
    /// Ledger row present but the signature or expiry check failed
    Malformed,
    /// Session is live but the user record is gone
    UnknownIdentity,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::MissingCredential => "missing credential",
            Rejection::ExpiredOrRevoked => "expired or revoked",
            Rejection::Malformed => "malformed token",
            Rejection::UnknownIdentity => "unknown identity",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to a request that passed the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn identity(&self) -> UserSummary {
        UserSummary {
            uid: self.uid,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl TryFrom<Claims> for AuthContext {
    type Error = Rejection;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(Rejection::Malformed)?;
        Ok(Self {
            uid: claims.uid,
            username: claims.username,
            email: claims.email,
            role: claims.role,
            expires_at,
        })
    }
}

/// Checks credentials against the ledger and the token signature
#[derive(Clone)]
pub struct SessionGuard {
    ledger: Arc<dyn TokenLedger>,
    issuer: Arc<TokenIssuer>,
}

impl SessionGuard {
    pub fn new(ledger: Arc<dyn TokenLedger>, issuer: Arc<TokenIssuer>) -> Self {
        Self { ledger, issuer }
    }

    /// Resolve a credential into an [`AuthContext`].
    ///
    /// Guard rejections come back as `AppError::Unauthenticated`; a failing
    /// ledger lookup is a server error, not a rejection.
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<AuthContext, AppError> {
        let token = match credential {
            Some(token) if !token.is_empty() => token,
            _ => return Err(reject(Rejection::MissingCredential)),
        };

        if !self.ledger.is_valid(token, Utc::now()).await? {
            return Err(reject(Rejection::ExpiredOrRevoked));
        }

        let claims = self.issuer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token failed verification");
            reject(Rejection::Malformed)
        })?;

        AuthContext::try_from(claims).map_err(reject)
    }
}

/// Count a rejection and wrap it for the response
pub(crate) fn reject(reason: Rejection) -> AppError {
    counter!(SESSION_REJECTED, "reason" => reason.as_str()).increment(1);
    AppError::Unauthenticated(reason)
}
