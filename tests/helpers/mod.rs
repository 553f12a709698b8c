// ABOUTME: Shared test helpers for HTTP integration tests
// ABOUTME: Exports the axum oneshot request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
