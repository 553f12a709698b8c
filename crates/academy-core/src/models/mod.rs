// ABOUTME: Core data models for the academy enrollment API
// ABOUTME: Re-exports Session, Enrollment, Payment and their status enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Data Models
//!
//! - `Session`: a scheduled offering of a course with a fixed seat capacity
//! - `Enrollment`: a prospective student's claim on a session
//! - `Payment`: the one-to-one payment record that follows an enrollment
//!
//! Status fields are closed enums. Unknown strings are rejected when parsed,
//! both at the HTTP boundary and when rows are read back from storage.

mod enrollment;
mod payment;
mod session;

pub use enrollment::{ContactDetails, Enrollment, EnrollmentStatus, NewEnrollment};
pub use payment::{Payment, PaymentStatus};
pub use session::{
    derive_session_status, NewSession, Session, SessionAvailability, SessionStatus,
    SessionUpdate,
};
