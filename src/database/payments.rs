// ABOUTME: Payment storage: schema, lookup and status upsert driven by enrollment transitions
// ABOUTME: One payment per enrollment, enforced by a unique constraint with cascade delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::mappers::{parse_payment, PAYMENT_COLUMNS};
use super::Database;
use crate::constants::intake::DEFAULT_CURRENCY;
use crate::errors::{AppError, AppResult};
use crate::models::{Payment, PaymentStatus};

impl Database {
    /// Create the payments table
    pub(super) async fn migrate_payments(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                enrollment_id TEXT NOT NULL UNIQUE REFERENCES enrollments(id) ON DELETE CASCADE,
                amount TEXT NOT NULL DEFAULT '0',
                currency TEXT NOT NULL DEFAULT 'EUR',
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'verified', 'paid', 'failed')),
                verified_by TEXT,
                payment_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create payments table: {e}")))?;

        Ok(())
    }

    /// Get the payment belonging to an enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_payment_for_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE enrollment_id = ?1"
        ))
        .bind(enrollment_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to get payment for enrollment {enrollment_id}: {e}"
            ))
        })?;

        row.as_ref().map(parse_payment).transpose()
    }
}

/// Insert the pending payment created alongside a new enrollment
pub async fn insert_pending(
    conn: &mut SqliteConnection,
    enrollment_id: Uuid,
    amount: Decimal,
    currency: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO payments (enrollment_id, amount, currency, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, 'pending', ?4, ?4)
        ",
    )
    .bind(enrollment_id.to_string())
    .bind(amount.to_string())
    .bind(currency)
    .bind(now)
    .execute(conn)
    .await
    .map_err(AppError::from)?;
    Ok(())
}

/// Move an enrollment's payment to `status`, creating the row if it is missing
///
/// - `pending` clears the verifier and payment date (restore)
/// - `verified` records `actor` and `now`
/// - `paid` keeps an existing verifier and date, filling them in otherwise
pub async fn upsert_status(
    conn: &mut SqliteConnection,
    enrollment_id: Uuid,
    status: PaymentStatus,
    actor: &str,
    now: DateTime<Utc>,
) -> AppResult<Payment> {
    let (verified_by, payment_date) = match status {
        PaymentStatus::Pending | PaymentStatus::Failed => (None, None),
        PaymentStatus::Verified | PaymentStatus::Paid => (Some(actor), Some(now)),
    };

    let row = sqlx::query(&format!(
        r"
        INSERT INTO payments (enrollment_id, amount, currency, status, verified_by, payment_date,
                              created_at, updated_at)
        VALUES (?1, '0', ?2, ?3, ?4, ?5, ?6, ?6)
        ON CONFLICT(enrollment_id) DO UPDATE SET
            status = excluded.status,
            verified_by = CASE WHEN excluded.status = 'paid'
                THEN COALESCE(payments.verified_by, excluded.verified_by)
                ELSE excluded.verified_by END,
            payment_date = CASE WHEN excluded.status = 'paid'
                THEN COALESCE(payments.payment_date, excluded.payment_date)
                ELSE excluded.payment_date END,
            updated_at = excluded.updated_at
        RETURNING {PAYMENT_COLUMNS}
        "
    ))
    .bind(enrollment_id.to_string())
    .bind(DEFAULT_CURRENCY)
    .bind(status.as_str())
    .bind(verified_by)
    .bind(payment_date)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    parse_payment(&row)
}
