// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the user identity, an issue time, an
//! expiry and a random `jti`. A signature-valid token is necessary but not
//! sufficient for a live session: the ledger decides revocation.
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use kodbank_common::{Role, UserId, UserSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn identity(&self) -> UserSummary {
        UserSummary {
            uid: self.uid,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with a single server secret
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Internal("token signing secret is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Sign a token for `identity`, valid for the configured TTL from now
    pub fn issue(&self, identity: &UserSummary) -> Result<IssuedToken, AppError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_at(
        &self,
        identity: &UserSummary,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AppError::Internal("token ttl out of range".to_string()))?;
        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(ttl_secs)
            .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;

        let claims = Claims {
            uid: identity.uid,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedToken {
            token,
            claims,
            expires_at,
        })
    }

    /// Check signature and expiry, returning the embedded claims.
    ///
    /// A token is valid strictly before `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(ErrorKind::ExpiredSignature.into());
        }
        Ok(claims)
    }
}
