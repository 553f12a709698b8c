// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Builds the per-request span carrying method, path and the propagated request ID
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use std::time::Duration;

use http::{HeaderName, Request};
use tracing::Span;

/// Header carrying the request ID in both directions
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Create the tracing span for an HTTP request
///
/// Runs after `SetRequestIdLayer`, so the header is normally present; a
/// missing or non-UTF-8 value leaves the field empty.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        status_code = tracing::field::Empty,
    )
}

/// Record the response status on the request span and log completion
pub fn record_response<B>(response: &http::Response<B>, latency: Duration, span: &Span) {
    let status = response.status();
    span.record("status_code", status.as_u16());

    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    if status.is_server_error() {
        tracing::warn!(status_code = status.as_u16(), latency_ms, "Request completed");
    } else {
        tracing::debug!(status_code = status.as_u16(), latency_ms, "Request completed");
    }
}
