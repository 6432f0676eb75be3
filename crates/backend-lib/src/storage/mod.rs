// ============================
// backend-lib/src/storage/mod.rs
// ============================
//! Persistent storage: a pooled SQLite database holding the user records
//! (credential store) and the issued session tokens (token ledger).
//!
//! The [`Database`] handle is opened once at startup, handed to every store
//! explicitly, and closed on shutdown. The pool is bounded: when every
//! connection is checked out, callers queue until `acquire_timeout` elapses.
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseSettings;
use crate::error::AppError;

pub mod ledger;
pub mod users;

pub use ledger::{SqlTokenLedger, TokenLedger, TokenRecord};
pub use users::{NewUser, SqlUserStore, UserIdentity, UserStore, EMAIL_TAKEN, USERNAME_TAKEN};

const SCHEMA: [&str; 5] = [
    r#"CREATE TABLE IF NOT EXISTS users (
        uid INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        phone TEXT NOT NULL,
        balance_minor INTEGER NOT NULL DEFAULT 0,
        role TEXT NOT NULL DEFAULT 'Customer'
            CHECK (role IN ('Customer', 'Manager', 'Admin')),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );"#,
    r#"CREATE TABLE IF NOT EXISTS user_tokens (
        tid INTEGER PRIMARY KEY AUTOINCREMENT,
        token TEXT NOT NULL,
        uid INTEGER NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
        expires_at INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );"#,
    "CREATE INDEX IF NOT EXISTS idx_user_tokens_token ON user_tokens(token);",
    "CREATE INDEX IF NOT EXISTS idx_user_tokens_uid ON user_tokens(uid);",
    "CREATE INDEX IF NOT EXISTS idx_user_tokens_expires_at ON user_tokens(expires_at);",
];

/// Handle to the connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool and create the schema if it does not exist yet.
    ///
    /// In-memory URLs give every pooled connection its own database, so use a
    /// file URL unless `max_connections` is 1.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&settings.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout())
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        tracing::info!(
            url = %settings.url,
            max_connections = settings.max_connections,
            "database ready"
        );
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Credential store backed by this pool
    pub fn users(&self) -> SqlUserStore {
        SqlUserStore::new(self.pool.clone())
    }

    /// Token ledger backed by this pool
    pub fn ledger(&self) -> SqlTokenLedger {
        SqlTokenLedger::new(self.pool.clone())
    }

    /// Wait for checked-out connections to return, then close them all
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database closed");
    }
}
