// ABOUTME: Unit tests for logging configuration
// ABOUTME: Validates defaults and environment variable handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use academy_server::config::{Environment, LogLevel, ServerConfig};
use academy_server::logging::{LogFormat, LoggingConfig, SERVICE_NAME};
use serial_test::serial;

fn clear_env() {
    for var in [
        "LOG_LEVEL",
        "LOG_FORMAT",
        "ENVIRONMENT",
        "SERVICE_NAME",
        "LOG_INCLUDE_LOCATION",
        "LOG_INCLUDE_SPANS",
    ] {
        env::remove_var(var);
    }
}

#[test]
fn test_default_logging_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.service_name, SERVICE_NAME);
    assert!(!config.include_location);
    assert!(!config.include_spans);
}

#[test]
#[serial]
fn test_logging_config_follows_server_config() {
    clear_env();
    env::set_var("LOG_FORMAT", "json");
    env::set_var("SERVICE_NAME", "academy-test");
    // Already folded into ServerConfig; must not be read a second time
    env::set_var("LOG_LEVEL", "trace");
    env::set_var("ENVIRONMENT", "development");

    let server = ServerConfig {
        log_level: LogLevel::Debug,
        environment: Environment::Production,
        ..ServerConfig::default()
    };
    let config = LoggingConfig::from_server_config(&server);
    clear_env();

    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.service_name, "academy-test");
    assert!(config.include_location);
}

#[test]
#[serial]
fn test_unknown_format_falls_back_to_pretty() {
    clear_env();
    env::set_var("LOG_FORMAT", "xml");
    env::set_var("LOG_INCLUDE_SPANS", "1");

    let config = LoggingConfig::from_server_config(&ServerConfig::default());
    clear_env();

    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.include_spans);
    assert!(!config.include_location);
}

#[test]
#[serial]
fn test_levels_parsed_from_env_reach_logging() {
    clear_env();
    env::set_var("LOG_LEVEL", "warn");
    env::set_var("ENVIRONMENT", "testing");

    let server = ServerConfig::from_env().unwrap();
    let config = LoggingConfig::from_server_config(&server);
    clear_env();

    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.level.to_tracing_level(), tracing::Level::WARN);
    assert_eq!(config.environment, Environment::Testing);
    assert!(!config.include_location);
}
