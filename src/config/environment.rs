// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Environment-based configuration management for production deployment

use std::env;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::database::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HTTP listener and middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Allowed CORS origins; empty or `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes
    pub max_request_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8081,
            cors_allowed_origins: vec!["*".into()],
            request_timeout_secs: 30,
            max_request_body_bytes: 64 * 1024,
        }
    }
}

impl HttpConfig {
    /// Load HTTP configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_var_or("HOST", &defaults.host),
            port: env_parse_or("HTTP_PORT", defaults.port)?,
            cors_allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            request_timeout_secs: env_parse_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            max_request_body_bytes: env_parse_or(
                "MAX_REQUEST_BODY_BYTES",
                defaults.max_request_body_bytes,
            )?,
        })
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether any origin may call the API
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty()
            || self.cors_allowed_origins.iter().any(|origin| origin == "*")
    }
}

/// Enrollment ledger tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Attempts made for an operation that hits storage contention
    pub max_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl LedgerConfig {
    /// Load ledger configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if `LEDGER_MAX_RETRIES` is not a positive integer
    pub fn from_env() -> AppResult<Self> {
        let max_retries: u32 = env_parse_or("LEDGER_MAX_RETRIES", Self::default().max_retries)?;
        if max_retries == 0 {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                "LEDGER_MAX_RETRIES must be at least 1",
            ));
        }
        Ok(Self { max_retries })
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServerConfig {
    /// HTTP listener and middleware
    pub http: HttpConfig,
    /// Database connection
    pub database: DatabaseConfig,
    /// Ledger retry behavior
    pub ledger: LedgerConfig,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            http: HttpConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            ledger: LedgerConfig::from_env()?,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
        })
    }

    /// Override the HTTP port
    #[must_use]
    pub const fn with_http_port(mut self, port: u16) -> Self {
        self.http.port = port;
        self
    }

    /// Override the database location
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse
    pub fn with_database_url(mut self, url: &str) -> AppResult<Self> {
        self.database.url = DatabaseUrl::parse_url(url)?;
        Ok(self)
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Academy Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Log Level: {}\n\
             - Database: {} (pool {}, busy timeout {}ms)\n\
             - Ledger Retries: {}\n\
             - CORS Origins: {}\n\
             - Request Timeout: {}s\n\
             - Max Body: {} bytes",
            self.environment,
            self.http.host,
            self.http.port,
            self.log_level,
            self.database.url,
            self.database.pool_size(),
            self.database.busy_timeout_ms,
            self.ledger.max_retries,
            if self.http.allows_any_origin() {
                "*".to_owned()
            } else {
                self.http.cors_allowed_origins.join(", ")
            },
            self.http.request_timeout_secs,
            self.http.max_request_body_bytes,
        )
    }
}

/// Read an environment variable with a default
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
///
/// A variable that is set but does not parse is a configuration error rather
/// than a silent fallback.
pub(crate) fn env_parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("Invalid {key} value '{raw}': {e}"),
            )
        }),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}
