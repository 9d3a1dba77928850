//! Backend configuration loaded from environment variables.
//!
//! Configuration is read ONCE at startup, validated eagerly, and passed to
//! every component; nothing re-reads the process environment per invocation.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `BACKEND_HOST` - Bind address (default: 127.0.0.1)
//! - `BACKEND_PORT` - Listen port (default: 4000)
//! - `DEFAULT_LOCALE` - Locale for freshly provisioned preferences
//!   (default: es)
//! - `PROFILES_COLLECTION`, `PREFERENCES_COLLECTION`,
//!   `STOREFRONTS_COLLECTION`, `ANALYTICS_COLLECTION` - Collection
//!   identifiers (defaults: profiles, preferences, storefronts, analytics)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Backend application configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Locale written into freshly provisioned preferences
    pub default_locale: String,
    /// Document collection identifiers
    pub collections: CollectionsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Names of the document collections the services operate on.
#[derive(Debug, Clone)]
pub struct CollectionsConfig {
    pub profiles: String,
    pub preferences: String,
    pub storefronts: String,
    pub analytics: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_owned(),
            preferences: "preferences".to_owned(),
            storefronts: "storefronts".to_owned(),
            analytics: "analytics".to_owned(),
        }
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BACKEND_DATABASE_URL")?;
        let host = get_env_or_default("BACKEND_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("BACKEND_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_PORT".to_owned(), e.to_string()))?;
        let default_locale = get_env_or_default("DEFAULT_LOCALE", "es");
        let collections = CollectionsConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            default_locale,
            collections,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CollectionsConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            profiles: get_env_or_default("PROFILES_COLLECTION", &defaults.profiles),
            preferences: get_env_or_default("PREFERENCES_COLLECTION", &defaults.preferences),
            storefronts: get_env_or_default("STOREFRONTS_COLLECTION", &defaults.storefronts),
            analytics: get_env_or_default("ANALYTICS_COLLECTION", &defaults.analytics),
        }
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections_defaults() {
        let collections = CollectionsConfig::default();
        assert_eq!(collections.profiles, "profiles");
        assert_eq!(collections.preferences, "preferences");
        assert_eq!(collections.storefronts, "storefronts");
        assert_eq!(collections.analytics, "analytics");
    }

    #[test]
    fn test_socket_addr() {
        let config = BackendConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 4000,
            default_locale: "es".to_owned(),
            collections: CollectionsConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 4000);
    }
}
