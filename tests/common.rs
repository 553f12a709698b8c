// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging, database, ledger, router and enrollment fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `academy_server`

use std::path::Path;
use std::sync::{Arc, Once};

use academy_server::{
    config::{DatabaseConfig, DatabaseUrl, LedgerConfig, ServerConfig},
    database::Database,
    ledger::EnrollmentLedger,
    models::{
        ContactDetails, EnrollmentStatus, NewEnrollment, NewSession, Session, SessionStatus,
    },
    server::{build_router, ServerResources},
};
use anyhow::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Course slug used by every fixture
pub const COURSE: &str = "web-development";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    Ok(Arc::new(Database::new(&DatabaseConfig::in_memory()).await?))
}

/// File-backed database under `dir`, with a pool wide enough for concurrency tests
pub async fn create_file_database(dir: &Path, max_connections: u32) -> Result<Arc<Database>> {
    init_test_logging();
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.join("academy.db"),
        },
        max_connections,
        busy_timeout_ms: 10_000,
    };
    Ok(Arc::new(Database::new(&config).await?))
}

/// Ledger over `database` with default retries
pub fn create_ledger(database: &Arc<Database>) -> EnrollmentLedger {
    EnrollmentLedger::new(Arc::clone(database), LedgerConfig::default())
}

/// Server resources over a fresh in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new(&DatabaseConfig::in_memory()).await?;
    Ok(Arc::new(ServerResources::new(
        database,
        ServerConfig::default(),
    )))
}

/// Full application router over `resources`
pub fn test_router(resources: &Arc<ServerResources>) -> axum::Router {
    build_router(Arc::clone(resources))
}

/// A published session open for registration
pub fn open_session(capacity: u32) -> NewSession {
    NewSession {
        course_slug: COURSE.to_owned(),
        title: format!("Cohort with {capacity} seats"),
        description: Some("Full-stack evening cohort".to_owned()),
        start_date: chrono::NaiveDate::from_ymd_opt(2025, 10, 6),
        end_date: chrono::NaiveDate::from_ymd_opt(2025, 12, 19),
        mode: Some("onsite".to_owned()),
        price: Some(Decimal::new(45000, 2)),
        capacity,
        status: SessionStatus::RegistrationOpen,
        is_published: true,
    }
}

/// Schedule an open session with `capacity` seats
pub async fn create_open_session(database: &Database, capacity: u32) -> Result<Session> {
    Ok(database.create_session(&open_session(capacity)).await?)
}

/// Validated admission input for `email`
pub fn new_enrollment(session_id: i64, email: &str) -> NewEnrollment {
    NewEnrollment {
        session_id,
        course_slug: COURSE.to_owned(),
        contact: ContactDetails {
            full_name: "Test Student".to_owned(),
            email: email.to_owned(),
            phone: Some("+355691234567".to_owned()),
            id_card: Some("J12345678A".to_owned()),
            address: None,
        },
        gdpr_consent: true,
        amount: Decimal::new(45000, 2),
        currency: "EUR".to_owned(),
    }
}

/// Admit `email` and return the new enrollment's ID
pub async fn admit(ledger: &EnrollmentLedger, session_id: i64, email: &str) -> Result<Uuid> {
    let admission = ledger
        .admit_enrollment(&new_enrollment(session_id, email))
        .await?;
    Ok(admission.enrollment.id)
}

/// Admit `email` and move it straight to `payment_confirmed`
pub async fn admit_confirmed(
    ledger: &EnrollmentLedger,
    session_id: i64,
    email: &str,
) -> Result<Uuid> {
    let id = admit(ledger, session_id, email).await?;
    ledger
        .transition_status(id, EnrollmentStatus::PaymentConfirmed, "admin@academy.test")
        .await?;
    Ok(id)
}

/// Intake request body as the public site sends it
pub fn intake_body(session_id: i64, email: &str) -> serde_json::Value {
    serde_json::json!({
        "courseSlug": COURSE,
        "sessionId": session_id,
        "studentName": "Arta Hoxha",
        "studentEmail": email,
        "studentPhone": "+355691234567",
        "studentIdCard": "J12345678A",
        "studentAddress": "Rruga e Kavajes, Tirane",
        "amount": "450.00",
        "currency": "EUR",
        "gdprConsent": true
    })
}
