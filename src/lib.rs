// ABOUTME: Main library entry point for the academy enrollment API
// ABOUTME: Course sessions, enrollment intake and the seat-capacity ledger behind a REST surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![deny(unsafe_code)]

//! # Academy Server
//!
//! REST backend for a training academy's public site and admin console.
//!
//! ## Architecture
//!
//! - **Database**: `SQLite` storage for sessions, enrollments and payments
//! - **Ledger**: the only write path for seat-affecting changes; keeps each
//!   session's occupied seats within capacity and its status in step
//! - **Intake**: request validation and normalization ahead of the ledger
//! - **Routes**: axum handlers translating ledger outcomes into HTTP
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use academy_server::config::ServerConfig;
//! use academy_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("{}", config.summary());
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` storage layer
pub mod database;

/// Unified error handling
pub mod errors;

/// Enrollment request validation
pub mod intake;

/// Enrollment/capacity ledger
pub mod ledger;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (CORS, request tracing)
pub mod middleware;

/// Domain models
pub mod models;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly and lifecycle
pub mod server;

/// Fixtures shared by unit tests, integration tests and benches
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
