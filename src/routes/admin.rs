// ABOUTME: Admin console status actions on enrollments
// ABOUTME: Accepts the console's action vocabulary (paid, cancel, restore) and calls the ledger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! Admin routes
//!
//! The console issues status changes either as a JSON `PUT` or as a plain
//! `GET` link with an `action` query parameter. Both accept canonical status
//! names as well as the shortcuts `paid`, `cancel` and `restore`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::enrollments::TransitionResponse;
use super::{actor_or_default, extracted, parse_enrollment_id};
use crate::errors::AppError;
use crate::models::EnrollmentStatus;
use crate::server::ServerResources;

/// Body of `PUT /api/admin/enrollment/{id}/status`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusRequest {
    /// Target status or console action
    pub status: Option<String>,
    /// Admin performing the change
    pub updated_by: Option<String>,
    /// Free-text note, logged with the change
    pub notes: Option<String>,
}

/// Query of `GET /api/admin/enrollment/{id}/status`
#[derive(Debug, Deserialize)]
pub struct AdminActionQuery {
    /// Console action
    pub action: Option<String>,
    /// Admin performing the change
    pub by: Option<String>,
}

/// Admin console routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/enrollment/:id/status",
                get(Self::handle_action_link).put(Self::handle_set_status),
            )
            .with_state(resources)
    }

    /// Handle a JSON status change
    async fn handle_set_status(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        payload: Result<Json<AdminStatusRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;
        let Json(request) = extracted(payload)?;

        let target = parse_action(request.status.as_deref(), "status")?;
        let actor = actor_or_default(request.updated_by);

        if let Some(notes) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            info!(enrollment.id = %enrollment_id, actor = %actor, notes, "Admin note on status change");
        }

        Self::apply(&resources, enrollment_id, target, &actor).await
    }

    /// Handle a status change issued as a link
    async fn handle_action_link(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        query: Result<Query<AdminActionQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let enrollment_id = parse_enrollment_id(&id)?;
        let Query(query) = extracted(query)?;

        let target = parse_action(query.action.as_deref(), "action")?;
        let actor = actor_or_default(query.by);

        Self::apply(&resources, enrollment_id, target, &actor).await
    }

    async fn apply(
        resources: &ServerResources,
        enrollment_id: Uuid,
        target: EnrollmentStatus,
        actor: &str,
    ) -> Result<Response, AppError> {
        let transition = resources
            .ledger
            .transition_status(enrollment_id, target, actor)
            .await?;

        Ok(Json(TransitionResponse::from(transition)).into_response())
    }
}

fn parse_action(raw: Option<&str>, field: &str) -> Result<EnrollmentStatus, AppError> {
    let action = raw
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::missing_field(field))?;
    EnrollmentStatus::from_admin_action(action)
}
