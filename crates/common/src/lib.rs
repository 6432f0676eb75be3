// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the `KodBank` client and server.
//! This module defines the JSON request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Surrogate identifier of a user record
pub type UserId = i64;

/// Role assigned to a user at registration
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Customer,
    Manager,
    Admin,
}

impl Role {
    /// Every role, in privilege order
    pub const ALL: [Role; 3] = [Role::Customer, Role::Manager, Role::Admin];

    /// Name as stored in the database and embedded in tokens
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Role::Customer),
            "Manager" => Ok(Role::Manager),
            "Admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Body of `POST /auth/register`
///
/// Missing fields deserialize as empty strings so the server can answer
/// with field-specific guidance instead of a generic parse failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: String,
}

/// Body of `POST /auth/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Public identity fields. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CheckAuthResponse {
    pub success: bool,
    pub authenticated: bool,
    pub user: UserSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileResponse {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub balance: f64,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BalanceResponse {
    pub username: String,
    pub balance: f64,
    pub currency: String,
}

/// Plain acknowledgement, e.g. after registration or logout
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
