// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod cookie;
pub mod password;
pub mod reaper;
pub mod session;
pub mod token;
mod service;
mod service_impl;

pub use cookie::{clearing_cookie, session_cookie, session_token, CookieConfig};
pub use password::{password_long_enough, CredentialHasher, MIN_PASSWORD_LENGTH};
pub use reaper::{spawn_ledger_reaper, sweep_expired};
pub use service::{AuthService, LoginOutcome};
pub use service_impl::DefaultAuth;
pub use session::{AuthContext, Rejection, SessionGuard};
pub use token::{Claims, IssuedToken, TokenIssuer};
