// ABOUTME: Transaction management with RAII guards and retry on storage contention
// ABOUTME: Automatic rollback on drop and exponential backoff for SQLite busy/locked errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Transaction management with RAII guards and retry patterns
//!
//! - `TransactionGuard`: RAII wrapper ensuring rollback if not committed
//! - `retry_transaction`: exponential backoff for `StorageConflict` errors
//!
//! ## Write-first transactions
//!
//! `SQLite` transactions begin deferred. Ledger operations make their first
//! statement a write against the row that guards the aggregate (the session
//! for admissions, the enrollment for transitions), so the database write lock
//! is held before any occupancy is read. Two concurrent check-then-act
//! sequences therefore serialize instead of both observing a free seat.
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = database.begin().await?;
//!     let session = sessions::lock_session(guard.executor()?, id).await?;
//!     let occupied = enrollments::count_occupied(guard.executor()?, id).await?;
//!     // ... act ...
//!     guard.commit().await?;
//!     Ok(result)
//! }, 3).await
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Retry an operation while it fails with a retryable storage conflict
///
/// Domain errors and non-retryable storage errors are returned immediately.
/// After `max_attempts` failed attempts the last conflict is surfaced to the
/// caller, which reports it as retryable.
///
/// # Exponential Backoff
/// - Attempt 1: 20ms
/// - Attempt 2: 40ms
/// - Attempt 3: 80ms
///
/// # Errors
/// * Returns the operation's error if it is not retryable or attempts are exhausted
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts: u32 = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    error!(
                        attempts = attempts,
                        max_attempts = max_attempts,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                let backoff_ms = 10_u64 << attempts.min(10);
                warn!(
                    attempt = attempts,
                    max_attempts = max_attempts,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction hit storage contention, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// RAII guard for database transactions ensuring automatic rollback on drop
///
/// If the guard is dropped before `commit()`, `SQLx` rolls the transaction
/// back. Commit consumes the guard.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Create a new transaction guard from an existing `SQLx` transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created - transaction will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns `StorageConflict` if the commit is blocked by another writer,
    /// or a database error if the commit fails otherwise
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit().await.map_err(AppError::from)?;
                self.committed = true;
                debug!("TransactionGuard committed successfully");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Explicitly rollback the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback operation fails
    pub async fn rollback(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction rollback failed: {e}")))?;
                debug!("TransactionGuard rolled back explicitly");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot rollback",
            )),
        }
    }

    /// Check if the transaction has been committed
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Get a mutable reference to the underlying connection for executing queries
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has already been committed or rolled back
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            debug!("TransactionGuard dropped without commit - rolling back");
        }
    }
}

/// Type alias for `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;
