// ABOUTME: Re-export of the unified error system from academy-core
// ABOUTME: Keeps crate::errors paths stable for handlers, storage and the ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Unified Error Handling System
//!
//! Defined in `academy-core` so that models and error codes compile once; see
//! [`academy_core::errors`].

pub use academy_core::errors::*;
