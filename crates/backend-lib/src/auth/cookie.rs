// ============================
// crates/backend-lib/src/auth/cookie.rs
// ============================
//! HttpOnly session cookie handling.
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::Settings;

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Set the Secure flag (production, served over HTTPS)
    pub secure: bool,
    pub max_age: time::Duration,
}

impl CookieConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let ttl_secs = i64::try_from(settings.auth.token_ttl_secs).unwrap_or(i64::MAX);
        Self {
            name: settings.auth.cookie_name.clone(),
            secure: settings.is_production(),
            max_age: time::Duration::seconds(ttl_secs),
        }
    }
}

/// Cookie carrying a freshly issued token
pub fn session_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(config.max_age)
        .build()
}

/// Expired, empty cookie that makes the browser drop the session cookie
pub fn clearing_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Token from the session cookie, if one was sent and is non-empty
pub fn session_token(jar: &CookieJar, config: &CookieConfig) -> Option<String> {
    jar.get(&config.name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
