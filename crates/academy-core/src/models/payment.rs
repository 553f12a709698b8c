// ABOUTME: Payment record that follows an enrollment one-to-one
// ABOUTME: PaymentStatus enum and the status each enrollment transition implies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EnrollmentStatus;
use crate::constants::payment_status;
use crate::errors::AppError;

/// Settlement state of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting transfer
    Pending,
    /// Transfer verified by an admin
    Verified,
    /// Settled on registration
    Paid,
    /// Transfer failed
    Failed,
}

impl PaymentStatus {
    /// Get string representation for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => payment_status::PENDING,
            Self::Verified => payment_status::VERIFIED,
            Self::Paid => payment_status::PAID,
            Self::Failed => payment_status::FAILED,
        }
    }

    /// Payment status implied by an enrollment entering `target`
    ///
    /// `None` means the payment is left as it is (cancellation keeps the
    /// record for accounting).
    #[must_use]
    pub const fn for_enrollment_status(target: EnrollmentStatus) -> Option<Self> {
        match target {
            EnrollmentStatus::Enrolled => Some(Self::Pending),
            EnrollmentStatus::PaymentConfirmed => Some(Self::Verified),
            EnrollmentStatus::Registered => Some(Self::Paid),
            EnrollmentStatus::Cancelled => None,
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            payment_status::PENDING => Ok(Self::Pending),
            payment_status::VERIFIED => Ok(Self::Verified),
            payment_status::PAID => Ok(Self::Paid),
            payment_status::FAILED => Ok(Self::Failed),
            _ => Err(AppError::invalid_input(format!(
                "Invalid payment status: {s}"
            ))),
        }
    }
}

/// Payment record for an enrollment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Surrogate identifier
    pub id: i64,
    /// Enrollment this payment belongs to
    pub enrollment_id: Uuid,
    /// Amount due
    pub amount: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    /// Settlement state
    pub status: PaymentStatus,
    /// Admin who verified the transfer
    pub verified_by: Option<String>,
    /// When the transfer was verified
    pub payment_date: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_leaves_payment_alone() {
        assert_eq!(
            PaymentStatus::for_enrollment_status(EnrollmentStatus::Cancelled),
            None
        );
    }

    #[test]
    fn test_confirmation_and_registration_settle_payment() {
        assert_eq!(
            PaymentStatus::for_enrollment_status(EnrollmentStatus::PaymentConfirmed),
            Some(PaymentStatus::Verified)
        );
        assert_eq!(
            PaymentStatus::for_enrollment_status(EnrollmentStatus::Registered),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(
            PaymentStatus::for_enrollment_status(EnrollmentStatus::Enrolled),
            Some(PaymentStatus::Pending)
        );
    }
}
