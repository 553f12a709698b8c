// ABOUTME: Enrollment route handlers: public intake plus admin reads, edits and status changes
// ABOUTME: Seat-affecting writes go through the ledger; reads come straight from the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Enrollment routes
//!
//! `POST /api/enrollments` is the public intake endpoint. Everything else here
//! serves the admin console.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{actor_or_default, extracted, parse_enrollment_id};
use crate::database::EnrollmentFilter;
use crate::errors::{AppError, LedgerError};
use crate::intake::{normalize_email, CreateEnrollmentRequest, UpdateContactRequest};
use crate::ledger::{Admission, Transition};
use crate::models::{Enrollment, EnrollmentStatus, Payment, SessionStatus};
use crate::server::ServerResources;

/// Successful intake response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Always `true`
    pub success: bool,
    /// ID of the new enrollment
    pub enrollment_id: Uuid,
    /// Always `enrolled` for a new enrollment
    pub status: EnrollmentStatus,
    /// Seats still free in the session
    pub available_spots: u32,
    /// Confirmation text for the enrollee
    pub message: String,
}

impl From<Admission> for AdmissionResponse {
    fn from(admission: Admission) -> Self {
        Self {
            success: true,
            enrollment_id: admission.enrollment.id,
            status: admission.enrollment.status,
            available_spots: admission.available_spots,
            message: "Enrollment received".to_owned(),
        }
    }
}

/// Response for any successful status change
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    /// Always `true`
    pub success: bool,
    /// Human-readable confirmation
    pub message: String,
    /// The enrollment after the change
    pub enrollment: Enrollment,
    /// Status before the change
    pub previous_status: EnrollmentStatus,
    /// Payment after the change, if it was touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    /// Session status after re-derivation
    pub session_status: SessionStatus,
    /// Seats held in the session after the change
    pub occupied: u32,
}

impl From<Transition> for TransitionResponse {
    fn from(transition: Transition) -> Self {
        Self {
            success: true,
            message: transition.enrollment.status.transition_message().to_owned(),
            previous_status: transition.previous_status,
            payment: transition.payment,
            session_status: transition.occupancy.status,
            occupied: transition.occupancy.occupied,
            enrollment: transition.enrollment,
        }
    }
}

/// Enrollment with its payment
#[derive(Debug, Serialize, Deserialize)]
pub struct EnrollmentDetails {
    /// The enrollment
    #[serde(flatten)]
    pub enrollment: Enrollment,
    /// Its payment, absent only for rows created outside the ledger
    pub payment: Option<Payment>,
}

/// Filtered enrollment listing
#[derive(Debug, Serialize, Deserialize)]
pub struct EnrollmentListResponse {
    /// Matching enrollments, newest first
    pub enrollments: Vec<Enrollment>,
    /// Number returned
    pub total: usize,
}

/// Duplicate-enrollment check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCheckResponse {
    /// Session checked
    pub session_id: i64,
    /// Normalized email checked
    pub email: String,
    /// Whether the email holds a non-cancelled enrollment
    pub enrolled: bool,
}

/// Query string of the enrollment listing
#[derive(Debug, Default, Deserialize)]
pub struct ListEnrollmentsQuery {
    /// Restrict to one session
    pub session_id: Option<i64>,
    /// Restrict to one status
    pub status: Option<String>,
    /// Restrict to one course
    pub course_slug: Option<String>,
}

impl ListEnrollmentsQuery {
    fn into_filter(self) -> Result<EnrollmentFilter, AppError> {
        Ok(EnrollmentFilter {
            session_id: self.session_id,
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .map(|s| EnrollmentStatus::from_str(s.trim()))
                .transpose()?,
            course_slug: self.course_slug.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Body of `PATCH /api/enrollments/{id}/status`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    /// Target status, one of the four canonical names
    pub status: Option<String>,
    /// Admin performing the change
    pub admin_email: Option<String>,
}

/// Enrollment routes
pub struct EnrollmentRoutes;

impl EnrollmentRoutes {
    /// Create all enrollment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/enrollments",
                post(Self::handle_create).get(Self::handle_list),
            )
            .route(
                "/api/enrollments/check/:session_id/:email",
                get(Self::handle_check),
            )
            .route(
                "/api/enrollments/:id",
                get(Self::handle_get)
                    .put(Self::handle_update_contact)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/enrollments/:id/status",
                patch(Self::handle_change_status),
            )
            .with_state(resources)
    }

    /// Handle public enrollment intake
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateEnrollmentRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = extracted(payload)?;
        let new_enrollment = request.validate()?;

        let admission = resources.ledger.admit_enrollment(&new_enrollment).await?;

        Ok((
            StatusCode::CREATED,
            Json(AdmissionResponse::from(admission)),
        )
            .into_response())
    }

    /// Handle the duplicate-enrollment check
    async fn handle_check(
        State(resources): State<Arc<ServerResources>>,
        path: Result<Path<(i64, String)>, PathRejection>,
    ) -> Result<Response, AppError> {
        let Path((session_id, raw_email)) = extracted(path)?;
        let email = normalize_email(&raw_email)?;

        let enrolled = resources
            .database
            .has_active_enrollment(session_id, &email)
            .await?;

        Ok(Json(EnrollmentCheckResponse {
            session_id,
            email,
            enrolled,
        })
        .into_response())
    }

    /// Handle the filtered listing
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<ListEnrollmentsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let Query(query) = extracted(query)?;
        let filter = query.into_filter()?;

        let enrollments = resources.database.list_enrollments(&filter).await?;

        Ok(Json(EnrollmentListResponse {
            total: enrollments.len(),
            enrollments,
        })
        .into_response())
    }

    /// Handle fetching one enrollment with its payment
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;

        let enrollment = resources
            .database
            .get_enrollment(enrollment_id)
            .await?
            .ok_or(LedgerError::enrollment_not_found(enrollment_id))?;
        let payment = resources
            .database
            .get_payment_for_enrollment(enrollment_id)
            .await?;

        Ok(Json(EnrollmentDetails {
            enrollment,
            payment,
        })
        .into_response())
    }

    /// Handle editing contact details
    async fn handle_update_contact(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        payload: Result<Json<UpdateContactRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;
        let Json(request) = extracted(payload)?;
        let contact = request.validate()?;

        let enrollment = resources
            .ledger
            .update_contact(enrollment_id, &contact)
            .await?;

        Ok(Json(serde_json::json!({
            "success": true,
            "message": "Enrollment updated",
            "enrollment": enrollment,
        }))
        .into_response())
    }

    /// Handle hard deletion
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;

        let removed = resources.ledger.delete_enrollment(enrollment_id).await?;

        Ok(Json(serde_json::json!({
            "success": true,
            "message": "Enrollment deleted",
            "enrollmentId": removed.id,
            "sessionId": removed.session_id,
        }))
        .into_response())
    }

    /// Handle a status change from the enrollment list view
    async fn handle_change_status(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        payload: Result<Json<StatusChangeRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;
        let Json(request) = extracted(payload)?;

        let target = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::missing_field("status"))?
            .parse::<EnrollmentStatus>()?;
        let actor = actor_or_default(request.admin_email);

        let transition = resources
            .ledger
            .transition_status(enrollment_id, target, &actor)
            .await?;

        Ok(Json(TransitionResponse::from(transition)).into_response())
    }
}
