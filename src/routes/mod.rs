// ABOUTME: Route module organization for the academy HTTP endpoints
// ABOUTME: Groups handlers by domain and shares extractor error translation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Route module for the academy server
//!
//! Each domain module holds route definitions and thin handlers that validate
//! input and delegate to the ledger or the database. Handlers return
//! `Result<Response, AppError>`; extractor rejections are folded into the same
//! JSON error body as everything else.

/// Admin console status actions
pub mod admin;
/// Enrollment intake and administration
pub mod enrollments;
/// Health and readiness probes
pub mod health;
/// Course session scheduling
pub mod sessions;

pub use admin::AdminRoutes;
pub use enrollments::EnrollmentRoutes;
pub use health::HealthRoutes;
pub use sessions::SessionRoutes;

use std::fmt::Display;

use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Turn an extractor rejection into a validation error
pub(crate) fn extracted<T, R: Display>(value: Result<T, R>) -> AppResult<T> {
    value.map_err(|rejection| AppError::invalid_input(rejection.to_string()))
}

/// Parse an enrollment ID taken from the request path
pub(crate) fn parse_enrollment_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid_format(format!("Invalid enrollment ID: {raw}")))
}

/// Pick the acting admin for audit fields, falling back to the console default
pub(crate) fn actor_or_default(actor: Option<String>) -> String {
    actor
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| crate::constants::admin::DEFAULT_ACTOR.to_owned())
}
