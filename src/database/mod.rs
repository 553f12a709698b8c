// ABOUTME: Database connection management and schema migrations for the academy store
// ABOUTME: Owns the SQLite pool and the sessions, enrollments and payments tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Database Management
//!
//! The relational store is the single source of truth for seat occupancy. It
//! holds three tables:
//!
//! - `sessions`: scheduled course offerings with a capacity and derived status
//! - `enrollments`: claims on a session, at most one non-cancelled per email
//! - `payments`: one row per enrollment, enforced by a unique constraint
//!
//! Pool-level methods on [`Database`] serve reads and simple administration.
//! Functions taking `&mut SqliteConnection` run inside a ledger transaction.

/// Enrollment queries
pub mod enrollments;
/// Row mapping helpers
pub mod mappers;
/// Payment queries
pub mod payments;
/// Session queries
pub mod sessions;
/// Transaction guard and retry helpers
pub mod transactions;

pub use enrollments::EnrollmentFilter;
pub use transactions::{retry_transaction, SqliteTransactionGuard, TransactionGuard};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::database::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Database manager for the academy tables
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config` and run migrations
    ///
    /// File databases run in WAL mode with a busy timeout so concurrent writers
    /// wait for the write lock instead of failing immediately. In-memory
    /// databases use a single long-lived connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| {
                AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Invalid database URL '{}': {e}", config.url),
                )
            })?
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout());

        let pool_options = SqlitePoolOptions::new()
            .max_connections(config.pool_size())
            .acquire_timeout(config.busy_timeout() * 2);

        let pool = match &config.url {
            DatabaseUrl::Memory => {
                pool_options
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                pool_options
                    .connect_with(
                        options
                            .create_if_missing(true)
                            .journal_mode(SqliteJournalMode::Wal)
                            .synchronous(SqliteSynchronous::Normal),
                    )
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to connect to {}: {e}", config.url)))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(
            database.url = %config.url,
            database.pool_size = config.pool_size(),
            "Database ready"
        );
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a guarded transaction
    ///
    /// # Errors
    ///
    /// Returns `StorageConflict` if no connection becomes available in time
    pub async fn begin(&self) -> AppResult<SqliteTransactionGuard<'static>> {
        let transaction = self.pool.begin().await.map_err(AppError::from)?;
        Ok(TransactionGuard::new(transaction))
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if creating a table or index fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_sessions().await?;
        self.migrate_enrollments().await?;
        self.migrate_payments().await?;
        debug!("Database migrations applied");
        Ok(())
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
