// ABOUTME: Course session model with capacity and derived availability status
// ABOUTME: SessionStatus enum, Session record, availability snapshot and status derivation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::session_status;
use crate::errors::AppError;

/// Public availability of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Announced but not yet accepting enrollments
    ComingSoon,
    /// Accepting enrollments
    RegistrationOpen,
    /// Every seat is occupied
    FullyBooked,
}

impl SessionStatus {
    /// Get string representation for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ComingSoon => session_status::COMING_SOON,
            Self::RegistrationOpen => session_status::REGISTRATION_OPEN,
            Self::FullyBooked => session_status::FULLY_BOOKED,
        }
    }

    /// Whether an administrator may set this status directly
    ///
    /// `fully_booked` only ever results from occupancy derivation.
    #[must_use]
    pub const fn is_admin_assignable(&self) -> bool {
        matches!(self, Self::ComingSoon | Self::RegistrationOpen)
    }
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            session_status::COMING_SOON => Ok(Self::ComingSoon),
            session_status::REGISTRATION_OPEN => Ok(Self::RegistrationOpen),
            session_status::FULLY_BOOKED => Ok(Self::FullyBooked),
            _ => Err(AppError::invalid_input(format!(
                "Invalid session status: {s}"
            ))),
        }
    }
}

/// Derive the status a session should carry for a given occupancy.
///
/// `coming_soon` is owned by scheduling administration and is never changed
/// here. Every other session is `fully_booked` exactly when
/// `occupied >= capacity`.
#[must_use]
pub const fn derive_session_status(
    current: SessionStatus,
    occupied: u32,
    capacity: u32,
) -> SessionStatus {
    match current {
        SessionStatus::ComingSoon => SessionStatus::ComingSoon,
        SessionStatus::RegistrationOpen | SessionStatus::FullyBooked => {
            if occupied >= capacity {
                SessionStatus::FullyBooked
            } else {
                SessionStatus::RegistrationOpen
            }
        }
    }
}

/// A scheduled offering of a course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Session identifier
    pub id: i64,
    /// Slug of the course this session belongs to
    pub course_slug: String,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// First day of the session
    pub start_date: Option<NaiveDate>,
    /// Last day of the session
    pub end_date: Option<NaiveDate>,
    /// Delivery mode (online, onsite, hybrid...)
    pub mode: Option<String>,
    /// Price per seat
    pub price: Option<Decimal>,
    /// Maximum number of occupied seats
    pub capacity: u32,
    /// Current availability status
    pub status: SessionStatus,
    /// Whether the session is visible and may accept enrollments
    pub is_published: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Whether a new enrollment may be admitted, capacity aside
    #[must_use]
    pub fn accepts_enrollments(&self) -> bool {
        self.is_published && self.status == SessionStatus::RegistrationOpen
    }
}

/// Fields for scheduling a new session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSession {
    /// Slug of the course this session belongs to
    pub course_slug: String,
    /// Display title
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// First day of the session
    pub start_date: Option<NaiveDate>,
    /// Last day of the session
    pub end_date: Option<NaiveDate>,
    /// Delivery mode
    pub mode: Option<String>,
    /// Price per seat
    pub price: Option<Decimal>,
    /// Maximum number of occupied seats
    pub capacity: u32,
    /// Initial scheduling status
    pub status: SessionStatus,
    /// Whether the session is visible
    pub is_published: bool,
}

/// Partial update of a session; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New first day
    pub start_date: Option<NaiveDate>,
    /// New last day
    pub end_date: Option<NaiveDate>,
    /// New delivery mode
    pub mode: Option<String>,
    /// New price
    pub price: Option<Decimal>,
    /// New publication flag
    pub is_published: Option<bool>,
    /// New capacity, validated against current occupancy
    pub capacity: Option<u32>,
    /// New scheduling status (`coming_soon` or `registration_open`)
    pub status: Option<SessionStatus>,
}

impl SessionUpdate {
    /// Whether the update touches capacity or status and must go through the ledger
    #[must_use]
    pub const fn affects_occupancy(&self) -> bool {
        self.capacity.is_some() || self.status.is_some()
    }
}

/// Point-in-time seat accounting for a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionAvailability {
    /// Session identifier
    pub session_id: i64,
    /// Maximum number of occupied seats
    pub capacity: u32,
    /// Seats held by `payment_confirmed` and `registered` enrollments
    pub occupied: u32,
    /// Seats still free
    pub available_spots: u32,
    /// Persisted status
    pub status: SessionStatus,
}

impl SessionAvailability {
    /// Build a snapshot from capacity and occupancy
    #[must_use]
    pub const fn new(session_id: i64, capacity: u32, occupied: u32, status: SessionStatus) -> Self {
        Self {
            session_id,
            capacity,
            occupied,
            available_spots: capacity.saturating_sub(occupied),
            status,
        }
    }
}
