// ============================
// backend-lib/src/storage/users.rs
// ============================
//! Credential store: user identity records.
use std::fmt;

use async_trait::async_trait;
use kodbank_common::{Role, UserId, UserSummary};
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already registered";

/// A stored user. Immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    /// Balance in minor currency units
    pub balance_minor: i64,
    pub role: Role,
}

impl UserIdentity {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            uid: self.uid,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    /// Balance in major units, as rendered to clients
    pub fn balance(&self) -> f64 {
        self.balance_minor as f64 / 100.0
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("uid", &self.uid)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("phone", &self.phone)
            .field("balance_minor", &self.balance_minor)
            .field("role", &self.role)
            .finish()
    }
}

/// Fields of a user about to be registered
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub balance_minor: i64,
    pub role: Role,
}

/// Trait for credential store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken username or email is a `Conflict`
    async fn create(&self, user: NewUser) -> Result<UserId, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AppError>;

    async fn find_by_id(&self, uid: UserId) -> Result<Option<UserIdentity>, AppError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
}

#[derive(FromRow)]
struct UserRow {
    uid: i64,
    username: String,
    email: String,
    password_hash: String,
    phone: String,
    balance_minor: i64,
    role: String,
}

impl TryFrom<UserRow> for UserIdentity {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(format!("user {}: {e}", row.uid)))?;
        Ok(Self {
            uid: row.uid,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            balance_minor: row.balance_minor,
            role,
        })
    }
}

const SELECT_USER: &str = "SELECT uid, username, email, password_hash, phone, balance_minor, role FROM users";

/// SQLite implementation of the `UserStore` trait
#[derive(Clone, Debug)]
pub struct SqlUserStore {
    pool: SqlitePool,
}

impl SqlUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqlUserStore {
    async fn create(&self, user: NewUser) -> Result<UserId, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, phone, balance_minor, role)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.balance_minor)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            // Lost a race with a concurrent registration
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                if db_err.message().contains("users.email") {
                    Err(AppError::Conflict(EMAIL_TAKEN.to_string()))
                } else {
                    Err(AppError::Conflict(USERNAME_TAKEN.to_string()))
                }
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, AppError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE username = ?1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserIdentity::try_from).transpose()
    }

    async fn find_by_id(&self, uid: UserId) -> Result<Option<UserIdentity>, AppError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE uid = ?1"))
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserIdentity::try_from).transpose()
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT uid FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT uid FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
