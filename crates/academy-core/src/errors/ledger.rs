// ABOUTME: Domain errors raised by the enrollment/capacity ledger
// ABOUTME: Typed admission and transition outcomes that convert into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Ledger Error Types
//!
//! Every rejection the ledger can produce is a variant here. The API layer never
//! inspects message strings; it converts through `From<LedgerError> for AppError`,
//! which fixes the error code and therefore the HTTP status.

use uuid::Uuid;

use super::{AppError, ErrorCode};
use crate::models::{EnrollmentStatus, SessionStatus};

/// Errors specific to admission, transition and session reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The referenced session does not exist
    #[error("Session {session_id} not found")]
    SessionNotFound {
        /// Session identifier
        session_id: i64,
    },
    /// The referenced enrollment does not exist
    #[error("Enrollment {enrollment_id} not found")]
    EnrollmentNotFound {
        /// Enrollment identifier
        enrollment_id: Uuid,
    },
    /// The session is unpublished or not accepting registrations
    #[error("{}", not_open_message(*status, *is_published))]
    SessionNotOpen {
        /// Session identifier
        session_id: i64,
        /// Current session status
        status: SessionStatus,
        /// Whether the session is published
        is_published: bool,
    },
    /// The email already holds a non-cancelled enrollment for the session
    #[error("You are already enrolled in this session")]
    DuplicateEnrollment {
        /// Session identifier
        session_id: i64,
        /// Normalized enrollee email
        email: String,
    },
    /// Admission rejected because every seat is taken
    #[error("Session is fully booked")]
    SessionFull {
        /// Session identifier
        session_id: i64,
        /// Session capacity
        capacity: u32,
    },
    /// A transition into a seat-consuming state found no free seat
    #[error("No seats left: {occupied} of {capacity} seats are already taken")]
    CapacityExceeded {
        /// Session identifier
        session_id: i64,
        /// Session capacity
        capacity: u32,
        /// Seats occupied when the transition was attempted
        occupied: u32,
    },
    /// The target status is not reachable from the current status
    #[error("Cannot change enrollment status from {from} to {to}")]
    InvalidTransition {
        /// Current enrollment status
        from: EnrollmentStatus,
        /// Requested enrollment status
        to: EnrollmentStatus,
    },
    /// Capacity edit would leave the session over-occupied
    #[error("Capacity {requested} is below the {occupied} seats already taken")]
    CapacityBelowOccupancy {
        /// Session identifier
        session_id: i64,
        /// Requested capacity
        requested: u32,
        /// Seats currently occupied
        occupied: u32,
    },
    /// Admins may only set scheduling statuses; availability is derived
    #[error("Session status {status} is derived from enrollments and cannot be set directly")]
    StatusNotAssignable {
        /// Requested status
        status: SessionStatus,
    },
    /// The enrollment's course does not match the session's course
    #[error("Session {session_id} does not belong to course '{course_slug}'")]
    CourseMismatch {
        /// Session identifier
        session_id: i64,
        /// Course slug sent by the client
        course_slug: String,
    },
}

impl LedgerError {
    /// Create a "session not found" error
    #[must_use]
    pub const fn session_not_found(session_id: i64) -> Self {
        Self::SessionNotFound { session_id }
    }

    /// Create an "enrollment not found" error
    #[must_use]
    pub const fn enrollment_not_found(enrollment_id: Uuid) -> Self {
        Self::EnrollmentNotFound { enrollment_id }
    }

    /// Create a "duplicate enrollment" error
    #[must_use]
    pub fn duplicate(session_id: i64, email: impl Into<String>) -> Self {
        Self::DuplicateEnrollment {
            session_id,
            email: email.into(),
        }
    }

    /// Create an "invalid transition" error
    #[must_use]
    pub const fn invalid_transition(from: EnrollmentStatus, to: EnrollmentStatus) -> Self {
        Self::InvalidTransition { from, to }
    }

    /// The error code this error reports as
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::SessionNotFound { .. } | Self::EnrollmentNotFound { .. } => {
                ErrorCode::ResourceNotFound
            }
            Self::SessionNotOpen { .. } => ErrorCode::SessionNotOpen,
            Self::DuplicateEnrollment { .. } => ErrorCode::DuplicateEnrollment,
            Self::SessionFull { .. } => ErrorCode::SessionFull,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::CapacityBelowOccupancy { .. } => ErrorCode::ValueOutOfRange,
            Self::StatusNotAssignable { .. } | Self::CourseMismatch { .. } => {
                ErrorCode::InvalidInput
            }
        }
    }
}

fn not_open_message(status: SessionStatus, is_published: bool) -> &'static str {
    match (is_published, status) {
        (false, _) => "Session is not available for enrollment",
        (true, SessionStatus::ComingSoon) => "Session is not yet open",
        (true, SessionStatus::FullyBooked) => "Session is fully booked",
        (true, SessionStatus::RegistrationOpen) => "Session is open",
    }
}

impl From<LedgerError> for AppError {
    fn from(error: LedgerError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_rejections_are_client_errors() {
        let duplicate: AppError = LedgerError::duplicate(1, "a@x.com").into();
        assert_eq!(duplicate.code, ErrorCode::DuplicateEnrollment);
        assert_eq!(duplicate.http_status(), 400);

        let full: AppError = LedgerError::SessionFull {
            session_id: 1,
            capacity: 3,
        }
        .into();
        assert_eq!(full.http_status(), 400);
        assert_eq!(full.message, "Session is fully booked");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error: AppError = LedgerError::enrollment_not_found(Uuid::nil()).into();
        assert_eq!(error.http_status(), 404);
    }

    #[test]
    fn test_invalid_transition_message_names_both_states() {
        let error = LedgerError::invalid_transition(
            EnrollmentStatus::Registered,
            EnrollmentStatus::Enrolled,
        );
        assert_eq!(
            error.to_string(),
            "Cannot change enrollment status from registered to enrolled"
        );
    }
}
