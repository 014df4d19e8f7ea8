//! Configuration module for environment variables and application settings
//!
//! The configuration is built once in `main` and handed to the server; nothing
//! in the crate reads the environment after startup.

use std::env;
use anyhow::{Context, Result, anyhow};
use chrono::Duration;

use crate::database::connection::DatabaseConfig;

/// Token lifetime used when `JWT_TTL_DAYS` is not set.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 12;

#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing configuration
    pub auth: AuthConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: String,
    /// How long an issued token stays valid
    pub token_ttl: Duration,
}

// Keeps the secret out of debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl,
        }
    }

    /// Load token settings from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let ttl_days = match env::var("JWT_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("JWT_TTL_DAYS is not a whole number of days: {raw}"))?,
            Err(_) => DEFAULT_TOKEN_TTL_DAYS,
        };
        if ttl_days <= 0 {
            anyhow::bail!("JWT_TTL_DAYS must be positive");
        }

        Ok(Self::new(jwt_secret, Duration::days(ttl_days)))
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            // PORT is what most hosting platforms inject
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth: AuthConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
