// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: compiled defaults, then `config/default.*`, then
//! either `config/local.*` or an explicit file, then `KODBANK_*` environment
//! variables (`__` separates nested keys, e.g. `KODBANK_AUTH__JWT_SECRET`).
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use config::{Config, Environment as EnvSource, File};
use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub cors: CorsSettings,
    pub bank: BankSettings,
    /// Mount point of every route; empty serves them at the root
    pub api_prefix: String,
    pub environment: Environment,
    pub log_level: String,
}

/// Deployment mode. Production hardens cookies and hides error diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite connection URL, e.g. `sqlite://kodbank.db`
    pub url: String,
    /// Upper bound of pooled connections
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC key for session tokens. Must be set; there is no fallback.
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub cookie_name: String,
    /// Interval of the expired-token sweep; 0 disables it
    pub reaper_interval_secs: u64,
    pub hashing: HashingSettings,
}

/// Argon2id cost parameters for new password hashes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankSettings {
    pub currency: String,
    /// Balance credited to new accounts, in minor units
    pub opening_balance_minor: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            auth: AuthSettings::default(),
            cors: CorsSettings::default(),
            bank: BankSettings::default(),
            api_prefix: String::new(),
            environment: Environment::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://kodbank.db".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 60 * 60 * 24, // 24 hours
            cookie_name: "authToken".to_string(),
            reaper_interval_secs: 60 * 60,
            hashing: HashingSettings::default(),
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            currency: "₹".to_string(),
            opening_balance_minor: 10_000_000, // 100000.00
        }
    }
}

impl DatabaseSettings {
    /// How long a caller waits for a pooled connection
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Settings {
    /// Load settings from `config/default.*`, `config/local.*` and the environment
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));
        Self::finish(builder)
    }

    /// Load settings with an explicit file in place of `config/local.*`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::from(path).required(true));
        Self::finish(builder)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .add_source(
                EnvSource::with_prefix("KODBANK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret must be set (KODBANK_AUTH__JWT_SECRET)");
        }
        if self.auth.token_ttl_secs == 0 {
            bail!("auth.token_ttl_secs must be greater than zero");
        }
        if self.auth.cookie_name.is_empty() {
            bail!("auth.cookie_name must not be empty");
        }
        let hashing = &self.auth.hashing;
        if let Err(e) = argon2::Params::new(
            hashing.memory_kib,
            hashing.iterations,
            hashing.parallelism,
            None,
        ) {
            bail!("invalid auth.hashing parameters: {e}");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        if self.database.url.is_empty() {
            bail!("database.url must not be empty");
        }
        self.cors_origin()?;
        if !self.api_prefix.is_empty()
            && (!self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/'))
        {
            bail!("api_prefix must start with '/' and must not end with '/'");
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("unknown log_level: {}", self.log_level);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.token_ttl_secs)
    }

    pub fn reaper_interval(&self) -> Option<Duration> {
        match self.auth.reaper_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// The single origin allowed to send credentialed requests
    pub fn cors_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.cors.frontend_url)
            .with_context(|| format!("invalid cors.frontend_url: {}", self.cors.frontend_url))
    }
}
