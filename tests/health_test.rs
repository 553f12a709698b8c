// ABOUTME: Integration tests for the liveness and readiness endpoints
// ABOUTME: Readiness reflects whether the database still answers queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_resources, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_service() {
    let resources = create_test_resources().await.unwrap();

    let response = AxumTestRequest::get("/health")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "academy-server");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_ready_with_live_database() {
    let resources = create_test_resources().await.unwrap();

    let response = AxumTestRequest::get("/ready")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_ready_after_database_closed() {
    let resources = create_test_resources().await.unwrap();
    resources.database.close().await;

    let response = AxumTestRequest::get("/ready")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let resources = create_test_resources().await.unwrap();

    let response = AxumTestRequest::get("/api/unknown")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 404);
    assert!(response.header("x-request-id").is_some());
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let resources = create_test_resources().await.unwrap();

    let response = AxumTestRequest::get("/health")
        .header("x-request-id", "req-1234")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.header("x-request-id").as_deref(), Some("req-1234"));
}
