// ============================
// backend-lib/src/storage/ledger.rs
// ============================
//! Token ledger: the record of issued, not yet revoked session tokens.
//!
//! The ledger is the source of truth for revocation. A token is live only
//! while its row exists and the stored expiry lies strictly in the future.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kodbank_common::UserId;
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub tid: i64,
    pub token: String,
    pub uid: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Trait for token ledger backends
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Append a row for a freshly issued token
    async fn save(
        &self,
        token: &str,
        uid: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<TokenRecord>, AppError>;

    /// True iff a row with this exact token exists and expires after `now`
    async fn is_valid(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Remove one row; removing a missing row is not an error
    async fn delete(&self, tid: i64) -> Result<(), AppError>;

    /// Remove every session of a user, returning how many were removed
    async fn delete_all_for_user(&self, uid: UserId) -> Result<u64, AppError>;

    /// Remove rows whose expiry is at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(FromRow)]
struct TokenRow {
    tid: i64,
    token: String,
    uid: i64,
    expires_at: i64,
}

impl TryFrom<TokenRow> for TokenRecord {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let expires_at = DateTime::from_timestamp_millis(row.expires_at).ok_or_else(|| {
            AppError::Internal(format!("token {} has an out-of-range expiry", row.tid))
        })?;
        Ok(Self {
            tid: row.tid,
            token: row.token,
            uid: row.uid,
            expires_at,
        })
    }
}

/// SQLite implementation of the `TokenLedger` trait
#[derive(Clone, Debug)]
pub struct SqlTokenLedger {
    pool: SqlitePool,
}

impl SqlTokenLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenLedger for SqlTokenLedger {
    async fn save(
        &self,
        token: &str,
        uid: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<TokenRecord, AppError> {
        // Stored with millisecond precision; echo back exactly what was stored
        let expires_ms = expires_at.timestamp_millis();
        let done = sqlx::query("INSERT INTO user_tokens (token, uid, expires_at) VALUES (?1, ?2, ?3)")
            .bind(token)
            .bind(uid)
            .bind(expires_ms)
            .execute(&self.pool)
            .await?;

        TokenRow {
            tid: done.last_insert_rowid(),
            token: token.to_string(),
            uid,
            expires_at: expires_ms,
        }
        .try_into()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<TokenRecord>, AppError> {
        let row: Option<TokenRow> =
            sqlx::query_as("SELECT tid, token, uid, expires_at FROM user_tokens WHERE token = ?1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        row.map(TokenRecord::try_from).transpose()
    }

    async fn is_valid(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT tid FROM user_tokens WHERE token = ?1 AND expires_at > ?2 LIMIT 1",
        )
        .bind(token)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn delete(&self, tid: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE tid = ?1")
            .bind(tid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all_for_user(&self, uid: UserId) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM user_tokens WHERE uid = ?1")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM user_tokens WHERE expires_at <= ?1")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
