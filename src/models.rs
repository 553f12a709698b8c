// ABOUTME: Re-export of the domain models from academy-core
// ABOUTME: Sessions, enrollments, payments and their status enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

pub use academy_core::models::*;
