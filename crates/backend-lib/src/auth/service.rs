use async_trait::async_trait;
use kodbank_common::{LoginRequest, RegisterRequest, UserId, UserSummary};

use super::{AuthContext, IssuedToken};
use crate::error::AppError;
use crate::storage::UserIdentity;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserSummary,
    pub token: IssuedToken,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate and store a new customer, returning the new uid
    async fn register(&self, request: RegisterRequest) -> Result<UserId, AppError>;
    /// Verify credentials and open a session
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AppError>;
    /// Revoke the session behind `credential`; true if one was revoked
    async fn logout(&self, credential: Option<&str>) -> Result<bool, AppError>;
    /// Current record of the authenticated user
    async fn profile(&self, context: &AuthContext) -> Result<UserIdentity, AppError>;
    /// Current identity of the authenticated user
    async fn check_auth(&self, context: &AuthContext) -> Result<UserSummary, AppError>;
}
