// ABOUTME: Enrollment model and its status state machine
// ABOUTME: EnrollmentStatus transitions, seat accounting, intake and contact DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::enrollment_status;
use crate::errors::AppError;

/// Lifecycle state of an enrollment
///
/// ```text
/// enrolled ──> payment_confirmed ──> registered
///    │  ▲               │                 │
///    ▼  │ (restore)     ▼                 ▼
///  cancelled <──────────┴─────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Submitted through intake, awaiting payment
    Enrolled,
    /// Bank transfer confirmed by an admin
    PaymentConfirmed,
    /// Registration finalized
    Registered,
    /// Withdrawn or rejected
    Cancelled,
}

impl EnrollmentStatus {
    /// Get string representation for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => enrollment_status::ENROLLED,
            Self::PaymentConfirmed => enrollment_status::PAYMENT_CONFIRMED,
            Self::Registered => enrollment_status::REGISTERED,
            Self::Cancelled => enrollment_status::CANCELLED,
        }
    }

    /// Whether an enrollment in this state holds one of the session's seats
    #[must_use]
    pub const fn occupies_seat(&self) -> bool {
        matches!(self, Self::PaymentConfirmed | Self::Registered)
    }

    /// Whether the state machine allows moving from `self` to `target`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Enrolled, Self::PaymentConfirmed | Self::Cancelled)
                | (Self::PaymentConfirmed, Self::Registered | Self::Cancelled)
                | (Self::Registered, Self::Cancelled)
                | (Self::Cancelled, Self::Enrolled)
        )
    }

    /// Whether a transition to `target` must claim a free seat first
    #[must_use]
    pub const fn claims_seat_on(&self, target: Self) -> bool {
        !self.occupies_seat() && target.occupies_seat()
    }

    /// Whether moving to `target` needs a free seat in the session
    ///
    /// True when the move claims a seat, and for a restore out of
    /// `cancelled`, which re-admits the enrollment against current capacity.
    #[must_use]
    pub const fn requires_free_seat(&self, target: Self) -> bool {
        self.claims_seat_on(target) || matches!((self, target), (Self::Cancelled, Self::Enrolled))
    }

    /// Parse the admin console's action vocabulary
    ///
    /// Accepts the canonical status names plus the console shortcuts
    /// `paid`, `cancel` and `restore`.
    pub fn from_admin_action(action: &str) -> Result<Self, AppError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "paid" | enrollment_status::PAYMENT_CONFIRMED => Ok(Self::PaymentConfirmed),
            enrollment_status::REGISTERED => Ok(Self::Registered),
            "cancel" | enrollment_status::CANCELLED => Ok(Self::Cancelled),
            "restore" | enrollment_status::ENROLLED => Ok(Self::Enrolled),
            other => Err(AppError::invalid_input(format!(
                "Unknown enrollment action: {other}"
            ))),
        }
    }

    /// Human-readable confirmation shown after a successful transition
    #[must_use]
    pub const fn transition_message(&self) -> &'static str {
        match self {
            Self::Enrolled => "Enrollment restored",
            Self::PaymentConfirmed => "Payment confirmed",
            Self::Registered => "Registration finalized",
            Self::Cancelled => "Enrollment cancelled",
        }
    }
}

impl Display for EnrollmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            enrollment_status::ENROLLED => Ok(Self::Enrolled),
            enrollment_status::PAYMENT_CONFIRMED => Ok(Self::PaymentConfirmed),
            enrollment_status::REGISTERED => Ok(Self::Registered),
            enrollment_status::CANCELLED => Ok(Self::Cancelled),
            _ => Err(AppError::invalid_input(format!(
                "Invalid enrollment status: {s}"
            ))),
        }
    }
}

/// A prospective student's claim on a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Enrollment identifier
    pub id: Uuid,
    /// Session the enrollment belongs to
    pub session_id: i64,
    /// Course slug, denormalized from the session
    pub course_slug: String,
    /// Student contact details
    #[serde(flatten)]
    pub contact: ContactDetails,
    /// Whether the student consented to data processing
    pub gdpr_consent: bool,
    /// Lifecycle state
    pub status: EnrollmentStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Student contact details carried by an enrollment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    /// Full name
    pub full_name: String,
    /// Normalized (trimmed, lowercase) email
    pub email: String,
    /// Phone number in international form
    pub phone: Option<String>,
    /// National ID card number
    pub id_card: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

/// Validated intake data ready for admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    /// Target session
    pub session_id: i64,
    /// Course slug the client believes the session belongs to
    pub course_slug: String,
    /// Student contact details
    pub contact: ContactDetails,
    /// Data processing consent, always `true` after validation
    pub gdpr_consent: bool,
    /// Amount due
    pub amount: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [EnrollmentStatus; 4] = [
        EnrollmentStatus::Enrolled,
        EnrollmentStatus::PaymentConfirmed,
        EnrollmentStatus::Registered,
        EnrollmentStatus::Cancelled,
    ];

    #[test]
    fn test_transition_table() {
        let allowed: Vec<(EnrollmentStatus, EnrollmentStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (EnrollmentStatus::Enrolled, EnrollmentStatus::PaymentConfirmed),
                (EnrollmentStatus::Enrolled, EnrollmentStatus::Cancelled),
                (EnrollmentStatus::PaymentConfirmed, EnrollmentStatus::Registered),
                (EnrollmentStatus::PaymentConfirmed, EnrollmentStatus::Cancelled),
                (EnrollmentStatus::Registered, EnrollmentStatus::Cancelled),
                (EnrollmentStatus::Cancelled, EnrollmentStatus::Enrolled),
            ]
        );
    }

    #[test]
    fn test_registered_cannot_skip_back_to_enrolled() {
        assert!(!EnrollmentStatus::Registered.can_transition_to(EnrollmentStatus::Enrolled));
    }

    #[test]
    fn test_only_confirmed_states_occupy_seats() {
        let occupying: Vec<_> = ALL.iter().filter(|s| s.occupies_seat()).collect();
        assert_eq!(
            occupying,
            vec![&EnrollmentStatus::PaymentConfirmed, &EnrollmentStatus::Registered]
        );
        assert!(EnrollmentStatus::Enrolled.claims_seat_on(EnrollmentStatus::PaymentConfirmed));
        assert!(!EnrollmentStatus::PaymentConfirmed.claims_seat_on(EnrollmentStatus::Registered));
        assert!(EnrollmentStatus::Cancelled.requires_free_seat(EnrollmentStatus::Enrolled));
        assert!(!EnrollmentStatus::Registered.requires_free_seat(EnrollmentStatus::Cancelled));
    }

    #[test]
    fn test_status_vocabulary_is_closed() {
        assert_eq!(
            "payment_confirmed".parse::<EnrollmentStatus>().unwrap(),
            EnrollmentStatus::PaymentConfirmed
        );
        for rejected in ["pending", "paid", "Registered", ""] {
            assert!(rejected.parse::<EnrollmentStatus>().is_err(), "{rejected}");
        }
    }

    #[test]
    fn test_admin_actions() {
        assert_eq!(
            EnrollmentStatus::from_admin_action("paid").unwrap(),
            EnrollmentStatus::PaymentConfirmed
        );
        assert_eq!(
            EnrollmentStatus::from_admin_action("Cancel").unwrap(),
            EnrollmentStatus::Cancelled
        );
        assert_eq!(
            EnrollmentStatus::from_admin_action("restore").unwrap(),
            EnrollmentStatus::Enrolled
        );
        assert!(EnrollmentStatus::from_admin_action("delete").is_err());
    }
}
