// ABOUTME: Test utilities for building sessions, enrollments and a ready ledger
// ABOUTME: Shared by unit tests, integration tests and benches to keep fixtures consistent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::{DatabaseConfig, LedgerConfig};
use crate::database::Database;
use crate::errors::AppResult;
use crate::ledger::EnrollmentLedger;
use crate::models::{ContactDetails, NewEnrollment, NewSession, Session, SessionStatus};

/// Course slug used by fixtures
pub const TEST_COURSE: &str = "web-development";

/// Open a fresh in-memory database
///
/// # Errors
///
/// Returns an error if the database cannot be opened
pub async fn create_test_database() -> AppResult<Arc<Database>> {
    Ok(Arc::new(Database::new(&DatabaseConfig::in_memory()).await?))
}

/// Open a fresh in-memory database and a ledger over it
///
/// # Errors
///
/// Returns an error if the database cannot be opened
pub async fn create_test_ledger() -> AppResult<EnrollmentLedger> {
    let database = create_test_database().await?;
    Ok(EnrollmentLedger::new(database, LedgerConfig::default()))
}

/// A published session open for registration
#[must_use]
pub fn open_session(capacity: u32) -> NewSession {
    NewSession {
        course_slug: TEST_COURSE.to_owned(),
        title: format!("Test cohort ({capacity} seats)"),
        description: None,
        start_date: None,
        end_date: None,
        mode: Some("onsite".to_owned()),
        price: Some(Decimal::new(25000, 2)),
        capacity,
        status: SessionStatus::RegistrationOpen,
        is_published: true,
    }
}

/// Schedule an open session of `capacity` seats
///
/// # Errors
///
/// Returns an error if the insert fails
pub async fn create_open_session(database: &Database, capacity: u32) -> AppResult<Session> {
    database.create_session(&open_session(capacity)).await
}

/// Contact details for `email`
#[must_use]
pub fn contact(email: &str) -> ContactDetails {
    ContactDetails {
        full_name: "Test Student".to_owned(),
        email: email.to_owned(),
        phone: Some("+355691234567".to_owned()),
        id_card: Some("J12345678A".to_owned()),
        address: None,
    }
}

/// Validated admission input for `email` in `session_id`
#[must_use]
pub fn new_enrollment(session_id: i64, email: &str) -> NewEnrollment {
    NewEnrollment {
        session_id,
        course_slug: TEST_COURSE.to_owned(),
        contact: contact(email),
        gdpr_consent: true,
        amount: Decimal::new(25000, 2),
        currency: "EUR".to_owned(),
    }
}
