// ============================
// kodbank backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `KodBank` HTTP server:
//! registration, login, cookie sessions and the guarded account routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::auth::{AuthService, CookieConfig, CredentialHasher, DefaultAuth, SessionGuard, TokenIssuer};
use crate::config::Settings;
use crate::error::AppError;
use crate::storage::{Database, TokenLedger, UserStore};

/// Application state shared across all handlers
pub struct AppState {
    /// Session lifecycle operations
    pub auth: Arc<dyn AuthService>,
    /// Session guard used by the protected routes
    pub guard: SessionGuard,
    /// Token ledger, shared with the reaper
    pub ledger: Arc<dyn TokenLedger>,
    pub cookies: CookieConfig,
    pub settings: Arc<Settings>,
    pub cors_origin: HeaderValue,
}

impl AppState {
    /// Wire the stores, issuer and hasher around an open database
    pub fn new(db: &Database, config: Settings) -> Result<Self, AppError> {
        let users: Arc<dyn UserStore> = Arc::new(db.users());
        let ledger: Arc<dyn TokenLedger> = Arc::new(db.ledger());
        let issuer = Arc::new(TokenIssuer::new(&config.auth.jwt_secret, config.token_ttl())?);
        let hasher = CredentialHasher::new(&config.auth.hashing)?;

        let auth = Arc::new(DefaultAuth::new(
            users,
            ledger.clone(),
            issuer.clone(),
            hasher,
            config.bank.opening_balance_minor,
        )?);
        let guard = SessionGuard::new(ledger.clone(), issuer);
        let cookies = CookieConfig::from_settings(&config);
        let cors_origin = config
            .cors_origin()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            auth,
            guard,
            ledger,
            cookies,
            settings: Arc::new(config),
            cors_origin,
        })
    }
}
