// ABOUTME: Unit tests for environment-driven server configuration
// ABOUTME: Validates defaults, overrides, DATABASE_URL parsing and invalid values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use academy_server::config::{
    DatabaseConfig, DatabaseUrl, Environment, LedgerConfig, LogLevel, ServerConfig,
};
use academy_server::errors::ErrorCode;
use serial_test::serial;

const VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "CORS_ALLOWED_ORIGINS",
    "REQUEST_TIMEOUT_SECS",
    "MAX_REQUEST_BODY_BYTES",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "DATABASE_BUSY_TIMEOUT_MS",
    "LEDGER_MAX_RETRIES",
    "LOG_LEVEL",
    "ENVIRONMENT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("trace"), LogLevel::Trace);
    assert_eq!(LogLevel::from_str_or_default("verbose"), LogLevel::Info);
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("staging"),
        Environment::Development
    );
    assert!(Environment::Production.is_production());
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(
        DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
        DatabaseUrl::Memory
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/academy.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/academy.db")
        }
    );
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:///var/lib/academy.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("/var/lib/academy.db")
        }
    );
    assert_eq!(
        DatabaseUrl::parse_url("academy.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("academy.db")
        }
    );

    let error = DatabaseUrl::parse_url("postgresql://localhost/academy").unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(DatabaseUrl::parse_url("   ").is_err());
    assert!(DatabaseUrl::parse_url("sqlite:").is_err());
}

#[test]
fn test_in_memory_pool_is_single_connection() {
    let config = DatabaseConfig {
        max_connections: 8,
        ..DatabaseConfig::in_memory()
    };
    assert_eq!(config.pool_size(), 1);
    assert_eq!(DatabaseConfig::default().pool_size(), 5);
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.http.port, 8081);
    assert!(config.http.allows_any_origin());
    assert_eq!(config.ledger.max_retries, 3);
    assert_eq!(config.database.busy_timeout_ms, 5000);
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var(
        "CORS_ALLOWED_ORIGINS",
        "https://academy.al, http://localhost:3000",
    );
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("LEDGER_MAX_RETRIES", "5");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("ENVIRONMENT", "production");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http.port, 9090);
    assert_eq!(
        config.http.cors_allowed_origins,
        vec!["https://academy.al", "http://localhost:3000"]
    );
    assert!(!config.http.allows_any_origin());
    assert!(config.database.url.is_memory());
    assert_eq!(config.ledger, LedgerConfig { max_retries: 5 });
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.environment, Environment::Production);
}

#[test]
#[serial]
fn test_invalid_values_are_errors() {
    clear_env();

    env::set_var("HTTP_PORT", "eighty");
    let error = ServerConfig::from_env().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("HTTP_PORT"));
    env::remove_var("HTTP_PORT");

    env::set_var("LEDGER_MAX_RETRIES", "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("LEDGER_MAX_RETRIES");

    env::set_var("DATABASE_MAX_CONNECTIONS", "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("DATABASE_MAX_CONNECTIONS");

    env::set_var("DATABASE_URL", "mysql://localhost/academy");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_cli_overrides() {
    let config = ServerConfig::default()
        .with_http_port(7000)
        .with_database_url("sqlite:/tmp/academy-test.db")
        .unwrap();

    assert_eq!(config.http.port, 7000);
    assert_eq!(
        config.database.url,
        DatabaseUrl::SQLite {
            path: PathBuf::from("/tmp/academy-test.db")
        }
    );
    assert!(ServerConfig::default()
        .with_database_url("redis://localhost")
        .is_err());
}
