// ABOUTME: Core types and constants for the academy enrollment platform
// ABOUTME: Foundation crate with error handling, domain models and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![deny(unsafe_code)]

//! # Academy Core
//!
//! Foundation crate providing shared types for the academy enrollment API. It is
//! designed to change infrequently, enabling incremental compilation benefits in
//! the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `LedgerError`
//! - **constants**: Status vocabularies and intake limits
//! - **models**: Sessions, enrollments, payments and the enrollment state machine

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Session, Enrollment, Payment and their status enums)
pub mod models;
