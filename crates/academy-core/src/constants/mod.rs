// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Status vocabularies, intake validation limits and listing caps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Constants module
//!
//! Storage-level status strings live here so that the enum `as_str`/`FromStr`
//! pairs and the SQL schema `CHECK` constraints agree on one vocabulary.

/// Session status strings as stored in the `sessions.status` column
pub mod session_status {
    /// Scheduled but not yet accepting enrollments
    pub const COMING_SOON: &str = "coming_soon";
    /// Accepting enrollments
    pub const REGISTRATION_OPEN: &str = "registration_open";
    /// Every seat is occupied
    pub const FULLY_BOOKED: &str = "fully_booked";
}

/// Enrollment status strings as stored in the `enrollments.status` column
pub mod enrollment_status {
    /// Initial state after intake
    pub const ENROLLED: &str = "enrolled";
    /// Bank transfer confirmed by an admin
    pub const PAYMENT_CONFIRMED: &str = "payment_confirmed";
    /// Registration finalized
    pub const REGISTERED: &str = "registered";
    /// Withdrawn or rejected
    pub const CANCELLED: &str = "cancelled";
}

/// Payment status strings as stored in the `payments.status` column
pub mod payment_status {
    /// Awaiting transfer
    pub const PENDING: &str = "pending";
    /// Transfer verified by an admin
    pub const VERIFIED: &str = "verified";
    /// Settled on registration
    pub const PAID: &str = "paid";
    /// Transfer failed
    pub const FAILED: &str = "failed";
}

/// Intake validation limits
pub mod intake {
    /// Exact length of a national ID card number
    pub const ID_CARD_LENGTH: usize = 10;
    /// Phone numbers are Albanian mobile numbers in international form
    pub const PHONE_PATTERN: &str = r"^\+355\d{9}$";
    /// Currency applied when the client sends none
    pub const DEFAULT_CURRENCY: &str = "EUR";
    /// Maximum length of free-text name fields
    pub const MAX_NAME_LENGTH: usize = 200;
}

/// Admin workflow defaults
pub mod admin {
    /// Actor recorded on payments when the request names none
    pub const DEFAULT_ACTOR: &str = "admin";
}

/// Listing limits
pub mod limits {
    /// Maximum rows returned by the enrollment listing
    pub const MAX_ENROLLMENT_LIST: i64 = 500;
    /// Maximum rows returned by a course's session listing
    pub const MAX_SESSION_LIST: i64 = 200;
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READY_CHECK: &str = "/ready";
}
