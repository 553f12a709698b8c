// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven server, database, HTTP and ledger configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Configuration module for the academy server
//!
//! All configuration is read from environment variables once at startup.
//!
//! - **environment**: `ServerConfig`, log level and deployment environment
//! - **database**: `DatabaseUrl` and connection pool settings

/// Database configuration types
pub mod database;
/// Environment and server configuration
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{Environment, HttpConfig, LedgerConfig, LogLevel, ServerConfig};
