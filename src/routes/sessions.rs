// ABOUTME: Course session scheduling routes: create, read, update, delete and availability
// ABOUTME: Capacity and scheduling status edits are routed through the ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Session routes

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extracted;
use crate::errors::{AppError, ErrorCode, LedgerError};
use crate::models::{NewSession, Session, SessionAvailability, SessionStatus, SessionUpdate};
use crate::server::ServerResources;

/// Body of `POST /api/courses/sessions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Owning course
    pub course_slug: Option<String>,
    /// Display title
    pub title: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
    /// Delivery mode
    pub mode: Option<String>,
    /// Seats, defaults to zero
    pub capacity: Option<u32>,
    /// Price per seat
    pub price: Option<Decimal>,
    /// `coming_soon` (default) or `registration_open`
    pub status: Option<String>,
    /// Visibility, defaults to hidden
    pub is_published: Option<bool>,
}

impl CreateSessionRequest {
    fn validate(self) -> Result<NewSession, AppError> {
        let course_slug = required(self.course_slug, "course_slug")?;
        let title = required(self.title, "title")?;
        check_date_order(self.start_date, self.end_date)?;
        check_price(self.price)?;

        Ok(NewSession {
            course_slug,
            title,
            description: trimmed(self.description),
            start_date: self.start_date,
            end_date: self.end_date,
            mode: trimmed(self.mode),
            price: self.price,
            capacity: self.capacity.unwrap_or(0),
            status: assignable_status(self.status.as_deref())?
                .unwrap_or(SessionStatus::ComingSoon),
            is_published: self.is_published.unwrap_or(false),
        })
    }
}

/// Body of `PUT /api/courses/sessions/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionRequest {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New first day
    pub start_date: Option<NaiveDate>,
    /// New last day
    pub end_date: Option<NaiveDate>,
    /// New delivery mode
    pub mode: Option<String>,
    /// New price
    pub price: Option<Decimal>,
    /// New visibility
    pub is_published: Option<bool>,
    /// New capacity
    pub capacity: Option<u32>,
    /// New scheduling status
    pub status: Option<String>,
}

impl UpdateSessionRequest {
    fn validate(self) -> Result<SessionUpdate, AppError> {
        check_date_order(self.start_date, self.end_date)?;
        check_price(self.price)?;

        Ok(SessionUpdate {
            title: trimmed(self.title),
            description: trimmed(self.description),
            start_date: self.start_date,
            end_date: self.end_date,
            mode: trimmed(self.mode),
            price: self.price,
            is_published: self.is_published,
            capacity: self.capacity,
            status: assignable_status(self.status.as_deref())?,
        })
    }
}

/// Query of the per-course listing
#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    /// Hide unpublished sessions
    #[serde(default)]
    pub published_only: bool,
}

/// Seat availability of a session
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    /// Session identifier
    pub session_id: i64,
    /// Total seats
    pub capacity: u32,
    /// Seats held
    pub occupied: u32,
    /// Seats free
    pub available_spots: u32,
    /// Persisted status
    pub status: SessionStatus,
}

impl From<SessionAvailability> for AvailabilityResponse {
    fn from(availability: SessionAvailability) -> Self {
        Self {
            session_id: availability.session_id,
            capacity: availability.capacity,
            occupied: availability.occupied,
            available_spots: availability.available_spots,
            status: availability.status,
        }
    }
}

/// Sessions of one course
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    /// Course the sessions belong to
    pub course_slug: String,
    /// Sessions ordered by start date
    pub sessions: Vec<Session>,
}

/// Course session routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/courses/sessions", post(Self::handle_create))
            .route(
                "/api/courses/sessions/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/courses/sessions/:id/availability",
                get(Self::handle_availability),
            )
            .route(
                "/api/courses/:course_slug/sessions",
                get(Self::handle_list),
            )
            .with_state(resources)
    }

    /// Handle scheduling a new session
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateSessionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = extracted(payload)?;
        let new_session = request.validate()?;

        let session = resources.database.create_session(&new_session).await?;
        info!(
            session.id = session.id,
            session.course = %session.course_slug,
            ledger.capacity = session.capacity,
            session.status = %session.status,
            "Session created"
        );

        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    /// Handle fetching one session
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let session = resources
            .database
            .get_session(session_id)
            .await?
            .ok_or(LedgerError::session_not_found(session_id))?;

        Ok(Json(session).into_response())
    }

    /// Handle a session edit
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<i64>,
        payload: Result<Json<UpdateSessionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let Json(request) = extracted(payload)?;
        let update = request.validate()?;

        let session = resources.ledger.update_session(session_id, &update).await?;

        Ok(Json(session).into_response())
    }

    /// Handle deleting an unreferenced session
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<i64>,
    ) -> Result<Response, AppError> {
        resources.database.delete_session(session_id).await?;
        info!(session.id = session_id, "Session deleted");

        Ok(Json(serde_json::json!({
            "success": true,
            "message": "Session deleted",
            "sessionId": session_id,
        }))
        .into_response())
    }

    /// Handle the seat availability read
    async fn handle_availability(
        State(resources): State<Arc<ServerResources>>,
        Path(session_id): Path<i64>,
    ) -> Result<Response, AppError> {
        let availability = resources.ledger.availability(session_id).await?;

        Ok(Json(AvailabilityResponse::from(availability)).into_response())
    }

    /// Handle listing a course's sessions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Path(course_slug): Path<String>,
        query: Result<Query<ListSessionsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let Query(query) = extracted(query)?;

        let sessions = resources
            .database
            .list_course_sessions(&course_slug, query.published_only)
            .await?;

        Ok(Json(SessionListResponse {
            course_slug,
            sessions,
        })
        .into_response())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    trimmed(value).ok_or_else(|| AppError::missing_field(field))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn assignable_status(raw: Option<&str>) -> Result<Option<SessionStatus>, AppError> {
    let Some(status) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let status = SessionStatus::from_str(status)?;
    if status.is_admin_assignable() {
        Ok(Some(status))
    } else {
        Err(LedgerError::StatusNotAssignable { status }.into())
    }
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("end_date {end} is before start_date {start}"),
        )),
        _ => Ok(()),
    }
}

fn check_price(price: Option<Decimal>) -> Result<(), AppError> {
    match price {
        Some(price) if price.is_sign_negative() && !price.is_zero() => Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("price must not be negative, got {price}"),
        )),
        _ => Ok(()),
    }
}
