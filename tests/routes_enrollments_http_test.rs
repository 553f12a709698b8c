// ABOUTME: HTTP integration tests for enrollment intake, admin edits and status-change routes
// ABOUTME: Drives the full router with oneshot requests against an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use academy_server::server::ServerResources;
use common::{create_open_session, create_test_resources, intake_body, test_router};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

async fn setup(capacity: u32) -> (Arc<ServerResources>, i64) {
    let resources = create_test_resources().await.unwrap();
    let session = create_open_session(&resources.database, capacity)
        .await
        .unwrap();
    (resources, session.id)
}

async fn enroll(resources: &Arc<ServerResources>, session_id: i64, email: &str) -> String {
    let response = AxumTestRequest::post("/api/enrollments")
        .json(&intake_body(session_id, email))
        .send(test_router(resources))
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    body["enrollmentId"].as_str().unwrap().to_owned()
}

async fn change_status(resources: &Arc<ServerResources>, id: &str, status: &str) -> (u16, Value) {
    let response = AxumTestRequest::patch(&format!("/api/enrollments/{id}/status"))
        .json(&json!({ "status": status, "adminEmail": "ops@academy.test" }))
        .send(test_router(resources))
        .await;
    (response.status(), response.json())
}

// ============================================================================
// POST /api/enrollments
// ============================================================================

#[tokio::test]
async fn test_intake_success_returns_created() {
    let (resources, session_id) = setup(5).await;

    let response = AxumTestRequest::post("/api/enrollments")
        .json(&intake_body(session_id, " Arta@Example.com "))
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 201);
    assert!(response.header("x-request-id").is_some());
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "enrolled");
    assert_eq!(body["availableSpots"], 5);
    assert!(body["enrollmentId"].is_string());
}

#[tokio::test]
async fn test_intake_duplicate_is_bad_request() {
    let (resources, session_id) = setup(5).await;
    enroll(&resources, session_id, "arta@example.com").await;

    let response = AxumTestRequest::post("/api/enrollments")
        .json(&intake_body(session_id, "ARTA@example.com"))
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "DUPLICATE_ENROLLMENT");
    assert_eq!(body["error"]["message"], "You are already enrolled in this session");
}

#[tokio::test]
async fn test_intake_validation_errors() {
    let (resources, session_id) = setup(5).await;

    let mut body = intake_body(session_id, "arta@example.com");
    body["studentIdCard"] = json!("12345");
    let response = AxumTestRequest::post("/api/enrollments")
        .json(&body)
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);
    let error: Value = response.json();
    assert_eq!(error["error"]["code"], "INVALID_FORMAT");

    let mut body = intake_body(session_id, "arta@example.com");
    body["studentPhone"] = json!("+38344123456");
    let response = AxumTestRequest::post("/api/enrollments")
        .json(&body)
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);

    let mut body = intake_body(session_id, "arta@example.com");
    body.as_object_mut().unwrap().remove("studentName");
    let response = AxumTestRequest::post("/api/enrollments")
        .json(&body)
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);
    let error: Value = response.json();
    assert_eq!(error["error"]["code"], "MISSING_REQUIRED_FIELD");

    // Nothing was written by the rejected requests
    let response = AxumTestRequest::get(&format!("/api/enrollments?session_id={session_id}"))
        .send(test_router(&resources))
        .await;
    let listing: Value = response.json();
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_intake_malformed_json_is_json_error() {
    let (resources, _) = setup(5).await;

    let response = AxumTestRequest::post("/api/enrollments")
        .header("content-type", "application/json")
        .raw_body("{not json")
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_intake_into_full_session() {
    let (resources, session_id) = setup(1).await;
    let id = enroll(&resources, session_id, "a@example.com").await;
    let (status, _) = change_status(&resources, &id, "payment_confirmed").await;
    assert_eq!(status, 200);

    let response = AxumTestRequest::post("/api/enrollments")
        .json(&intake_body(session_id, "b@example.com"))
        .send(test_router(&resources))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "SESSION_FULL");
    assert_eq!(body["error"]["message"], "Session is fully booked");
}

// ============================================================================
// PATCH /api/enrollments/{id}/status
// ============================================================================

#[tokio::test]
async fn test_status_change_returns_enrollment_and_message() {
    let (resources, session_id) = setup(1).await;
    let id = enroll(&resources, session_id, "a@example.com").await;

    let (status, body) = change_status(&resources, &id, "payment_confirmed").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment confirmed");
    assert_eq!(body["enrollment"]["status"], "payment_confirmed");
    assert_eq!(body["previousStatus"], "enrolled");
    assert_eq!(body["payment"]["status"], "verified");
    assert_eq!(body["payment"]["verifiedBy"], "ops@academy.test");
    assert_eq!(body["sessionStatus"], "fully_booked");
    assert_eq!(body["occupied"], 1);
}

#[tokio::test]
async fn test_status_change_errors() {
    let (resources, session_id) = setup(2).await;
    let id = enroll(&resources, session_id, "a@example.com").await;

    let (status, body) = change_status(&resources, &id, "registered").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (status, body) = change_status(&resources, &id, "paid").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, body) = change_status(&resources, &missing, "cancelled").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");

    let (status, _) = change_status(&resources, "not-a-uuid", "cancelled").await;
    assert_eq!(status, 400);
}

// ============================================================================
// Admin console routes
// ============================================================================

#[tokio::test]
async fn test_admin_put_and_action_link() {
    let (resources, session_id) = setup(1).await;
    let id = enroll(&resources, session_id, "a@example.com").await;

    let response = AxumTestRequest::put(&format!("/api/admin/enrollment/{id}/status"))
        .json(&json!({ "status": "paid", "updatedBy": "finance@academy.test", "notes": "Bank transfer" }))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["enrollment"]["status"], "payment_confirmed");
    assert_eq!(body["payment"]["verifiedBy"], "finance@academy.test");

    let response = AxumTestRequest::get(&format!(
        "/api/admin/enrollment/{id}/status?action=registered"
    ))
    .send(test_router(&resources))
    .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Registration finalized");
    assert_eq!(body["payment"]["status"], "paid");

    let response = AxumTestRequest::get(&format!(
        "/api/admin/enrollment/{id}/status?action=cancel"
    ))
    .send(test_router(&resources))
    .await;
    let body: Value = response.json();
    assert_eq!(body["enrollment"]["status"], "cancelled");
    assert_eq!(body["sessionStatus"], "registration_open");

    let response = AxumTestRequest::get(&format!("/api/admin/enrollment/{id}/status"))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_admin_restore_respects_capacity() {
    let (resources, session_id) = setup(1).await;
    let a = enroll(&resources, session_id, "a@example.com").await;
    change_status(&resources, &a, "payment_confirmed").await;
    change_status(&resources, &a, "cancelled").await;

    let b = enroll(&resources, session_id, "b@example.com").await;
    let (status, _) = change_status(&resources, &b, "payment_confirmed").await;
    assert_eq!(status, 200);

    let response = AxumTestRequest::get(&format!(
        "/api/admin/enrollment/{a}/status?action=restore"
    ))
    .send(test_router(&resources))
    .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");
}

// ============================================================================
// Reads, edits and deletion
// ============================================================================

#[tokio::test]
async fn test_get_enrollment_with_payment() {
    let (resources, session_id) = setup(3).await;
    let id = enroll(&resources, session_id, "a@example.com").await;

    let response = AxumTestRequest::get(&format!("/api/enrollments/{id}"))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["email"], "a@example.com");
    assert_eq!(body["status"], "enrolled");
    assert_eq!(body["payment"]["status"], "pending");
    assert_eq!(body["payment"]["currency"], "EUR");

    // Nested records use the same camelCase keys as the envelope
    assert_eq!(body["sessionId"], session_id);
    assert_eq!(body["fullName"], "Arta Hoxha");
    assert_eq!(body["idCard"], "J12345678A");
    assert_eq!(body["gdprConsent"], true);
    assert_eq!(body["payment"]["enrollmentId"], id.as_str());
    assert!(body["payment"]["verifiedBy"].is_null());
    assert!(body.get("full_name").is_none());
    assert!(body["payment"].get("enrollment_id").is_none());
}

#[tokio::test]
async fn test_check_and_list_enrollments() {
    let (resources, session_id) = setup(3).await;
    let a = enroll(&resources, session_id, "a@example.com").await;
    enroll(&resources, session_id, "b@example.com").await;
    change_status(&resources, &a, "cancelled").await;

    let response = AxumTestRequest::get(&format!(
        "/api/enrollments/check/{session_id}/B@Example.com"
    ))
    .send(test_router(&resources))
    .await;
    let body: Value = response.json();
    assert_eq!(body["enrolled"], true);
    assert_eq!(body["email"], "b@example.com");

    let response = AxumTestRequest::get(&format!(
        "/api/enrollments/check/{session_id}/a@example.com"
    ))
    .send(test_router(&resources))
    .await;
    let body: Value = response.json();
    assert_eq!(body["enrolled"], false);

    let response = AxumTestRequest::get(&format!(
        "/api/enrollments?session_id={session_id}&status=cancelled"
    ))
    .send(test_router(&resources))
    .await;
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["enrollments"][0]["email"], "a@example.com");

    let response = AxumTestRequest::get("/api/enrollments?status=waitlisted")
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_update_contact_details() {
    let (resources, session_id) = setup(3).await;
    let a = enroll(&resources, session_id, "a@example.com").await;
    enroll(&resources, session_id, "b@example.com").await;

    let response = AxumTestRequest::put(&format!("/api/enrollments/{a}"))
        .json(&json!({
            "fullName": "Arta Krasniqi",
            "email": "Arta.K@Example.com",
            "phone": "+355 68 765 4321"
        }))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["enrollment"]["fullName"], "Arta Krasniqi");
    assert_eq!(body["enrollment"]["email"], "arta.k@example.com");
    assert_eq!(body["enrollment"]["phone"], "+355687654321");

    let response = AxumTestRequest::put(&format!("/api/enrollments/{a}"))
        .json(&json!({ "fullName": "Arta Krasniqi", "email": "b@example.com" }))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "DUPLICATE_ENROLLMENT");
}

#[tokio::test]
async fn test_delete_enrollment_reopens_session() {
    let (resources, session_id) = setup(1).await;
    let id = enroll(&resources, session_id, "a@example.com").await;
    change_status(&resources, &id, "payment_confirmed").await;

    let response = AxumTestRequest::delete(&format!("/api/enrollments/{id}"))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 200);

    let response = AxumTestRequest::get(&format!(
        "/api/courses/sessions/{session_id}/availability"
    ))
    .send(test_router(&resources))
    .await;
    let body: Value = response.json();
    assert_eq!(body["occupied"], 0);
    assert_eq!(body["availableSpots"], 1);
    assert_eq!(body["status"], "registration_open");

    let response = AxumTestRequest::delete(&format!("/api/enrollments/{id}"))
        .send(test_router(&resources))
        .await;
    assert_eq!(response.status(), 404);
}
