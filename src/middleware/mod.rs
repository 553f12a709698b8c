// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Request ID propagation and per-request spans for structured logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

/// CORS configuration
pub mod cors;
/// Request tracing spans
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::{make_request_span, record_response, REQUEST_ID_HEADER};
