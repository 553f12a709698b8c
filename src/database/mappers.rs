// ABOUTME: SQL row to model conversion helpers for the academy tables
// ABOUTME: Parses sessions, enrollments and payments out of SQLite rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Model ↔ SQL row conversion helpers
//!
//! Status columns are parsed through the closed enums, so a row holding an
//! unknown status is reported as a database error instead of being coerced.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{
    ContactDetails, Enrollment, EnrollmentStatus, Payment, PaymentStatus, Session, SessionStatus,
};

/// Column list selected for sessions
pub const SESSION_COLUMNS: &str = "id, course_slug, title, description, start_date, end_date, \
     mode, price, capacity, status, is_published, created_at, updated_at";

/// Column list selected for enrollments
pub const ENROLLMENT_COLUMNS: &str = "id, session_id, course_slug, full_name, email, phone, \
     id_card, address, gdpr_consent, status, created_at, updated_at";

/// Column list selected for payments
pub const PAYMENT_COLUMNS: &str = "id, enrollment_id, amount, currency, status, verified_by, \
     payment_date, created_at, updated_at";

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> AppResult<T>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to get column '{name}': {e}")))
}

fn parse_column<T>(row: &SqliteRow, name: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e| AppError::database(format!("Invalid value in column '{name}': {e}")))
}

fn seat_count(row: &SqliteRow, name: &str) -> AppResult<u32> {
    let raw: i64 = column(row, name)?;
    u32::try_from(raw)
        .map_err(|_| AppError::database(format!("Column '{name}' out of range: {raw}")))
}

/// Parse a `Uuid` stored as hyphenated text
pub fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::database(format!("Invalid UUID '{raw}': {e}")))
}

/// Parse a `Session` from a row selected with [`SESSION_COLUMNS`]
pub fn parse_session(row: &SqliteRow) -> AppResult<Session> {
    let price: Option<String> = column(row, "price")?;
    let price = price
        .map(|raw| {
            Decimal::from_str(&raw)
                .map_err(|e| AppError::database(format!("Invalid price '{raw}': {e}")))
        })
        .transpose()?;

    Ok(Session {
        id: column(row, "id")?,
        course_slug: column(row, "course_slug")?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        start_date: column(row, "start_date")?,
        end_date: column(row, "end_date")?,
        mode: column(row, "mode")?,
        price,
        capacity: seat_count(row, "capacity")?,
        status: parse_column::<SessionStatus>(row, "status")?,
        is_published: column(row, "is_published")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse an `Enrollment` from a row selected with [`ENROLLMENT_COLUMNS`]
pub fn parse_enrollment(row: &SqliteRow) -> AppResult<Enrollment> {
    let id: String = column(row, "id")?;

    Ok(Enrollment {
        id: parse_uuid(&id)?,
        session_id: column(row, "session_id")?,
        course_slug: column(row, "course_slug")?,
        contact: ContactDetails {
            full_name: column(row, "full_name")?,
            email: column(row, "email")?,
            phone: column(row, "phone")?,
            id_card: column(row, "id_card")?,
            address: column(row, "address")?,
        },
        gdpr_consent: column(row, "gdpr_consent")?,
        status: parse_column::<EnrollmentStatus>(row, "status")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse a `Payment` from a row selected with [`PAYMENT_COLUMNS`]
pub fn parse_payment(row: &SqliteRow) -> AppResult<Payment> {
    let enrollment_id: String = column(row, "enrollment_id")?;

    Ok(Payment {
        id: column(row, "id")?,
        enrollment_id: parse_uuid(&enrollment_id)?,
        amount: parse_column::<Decimal>(row, "amount")?,
        currency: column(row, "currency")?,
        status: parse_column::<PaymentStatus>(row, "status")?,
        verified_by: column(row, "verified_by")?,
        payment_date: column(row, "payment_date")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}
