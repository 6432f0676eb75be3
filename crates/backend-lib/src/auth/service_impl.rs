use std::sync::Arc;

use async_trait::async_trait;
use kodbank_common::{LoginRequest, RegisterRequest, Role, UserId, UserSummary};
use metrics::counter;
use zeroize::Zeroizing;

use super::session::reject;
use super::{
    password_long_enough, AuthContext, AuthService, CredentialHasher, LoginOutcome, Rejection,
    TokenIssuer, MIN_PASSWORD_LENGTH,
};
use crate::error::AppError;
use crate::metrics::{AUTH_LOGIN_FAILURE, AUTH_LOGIN_SUCCESS, AUTH_LOGOUT, AUTH_REGISTER};
use crate::storage::{NewUser, TokenLedger, UserIdentity, UserStore, EMAIL_TAKEN, USERNAME_TAKEN};

/// Verified against when the username is unknown, so both failure paths
/// pay for one hash verification.
const DECOY_PASSWORD: &str = "kodbank-decoy-password";

pub struct DefaultAuth {
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn TokenLedger>,
    issuer: Arc<TokenIssuer>,
    hasher: CredentialHasher,
    opening_balance_minor: i64,
    decoy_hash: String,
}

impl DefaultAuth {
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn TokenLedger>,
        issuer: Arc<TokenIssuer>,
        hasher: CredentialHasher,
        opening_balance_minor: i64,
    ) -> Result<Self, AppError> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            users,
            ledger,
            issuer,
            hasher,
            opening_balance_minor,
            decoy_hash,
        })
    }

    fn login_failed(username: &str, reason: &'static str) -> AppError {
        tracing::warn!(%username, reason, "login failed");
        counter!(AUTH_LOGIN_FAILURE).increment(1);
        AppError::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register(&self, request: RegisterRequest) -> Result<UserId, AppError> {
        let RegisterRequest {
            username,
            email,
            password,
            confirm_password,
            phone,
        } = request;
        let password = Zeroizing::new(password);
        let confirm_password = Zeroizing::new(confirm_password);

        let fields = [
            username.as_str(),
            email.as_str(),
            password.as_str(),
            confirm_password.as_str(),
            phone.as_str(),
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation("All fields are required".to_string()));
        }
        if *password != *confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if !password_long_enough(&password) {
            return Err(AppError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.users.username_exists(&username).await? {
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }
        if self.users.email_exists(&email).await? {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = self.hasher.hash_blocking(password).await?;
        let uid = self
            .users
            .create(NewUser {
                username: username.clone(),
                email,
                password_hash,
                phone,
                balance_minor: self.opening_balance_minor,
                role: Role::Customer,
            })
            .await?;

        tracing::info!(uid, %username, "user registered");
        counter!(AUTH_REGISTER).increment(1);
        Ok(uid)
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AppError> {
        let LoginRequest { username, password } = request;
        let password = Zeroizing::new(password);

        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let user = self.users.find_by_username(&username).await?;
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.decoy_hash.clone());
        let verified = self.hasher.verify_blocking(password, hash).await?;

        let user = match user {
            Some(user) if verified => user,
            Some(_) => return Err(Self::login_failed(&username, "wrong password")),
            None => return Err(Self::login_failed(&username, "unknown username")),
        };

        let identity = user.summary();
        let token = self.issuer.issue(&identity)?;
        self.ledger
            .save(&token.token, identity.uid, token.expires_at)
            .await?;

        tracing::info!(uid = identity.uid, username = %identity.username, "login succeeded");
        counter!(AUTH_LOGIN_SUCCESS).increment(1);
        Ok(LoginOutcome {
            user: identity,
            token,
        })
    }

    async fn logout(&self, credential: Option<&str>) -> Result<bool, AppError> {
        let token = match credential {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(false),
        };

        match self.ledger.find_by_token(token).await? {
            Some(record) => {
                self.ledger.delete(record.tid).await?;
                tracing::info!(uid = record.uid, "session revoked");
                counter!(AUTH_LOGOUT).increment(1);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn profile(&self, context: &AuthContext) -> Result<UserIdentity, AppError> {
        self.users
            .find_by_id(context.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn check_auth(&self, context: &AuthContext) -> Result<UserSummary, AppError> {
        match self.users.find_by_id(context.uid).await? {
            Some(user) => Ok(user.summary()),
            None => Err(reject(Rejection::UnknownIdentity)),
        }
    }
}
