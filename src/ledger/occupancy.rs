// ABOUTME: Occupancy recomputation shared by every ledger write path
// ABOUTME: Counts seat-holding enrollments and persists the derived session status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::info;

use crate::database::{enrollments, sessions};
use crate::errors::AppResult;
use crate::models::{derive_session_status, Session, SessionStatus};

/// Seat accounting for a session after a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    /// Seats held by `payment_confirmed` and `registered` enrollments
    pub occupied: u32,
    /// Status persisted for the session
    pub status: SessionStatus,
}

/// Recount the session's occupied seats and persist the derived status
///
/// Must run inside the transaction that performed the write, after the write.
/// The status column is only touched when the derived value differs.
pub async fn reconcile(
    conn: &mut SqliteConnection,
    session: &Session,
    now: DateTime<Utc>,
) -> AppResult<Occupancy> {
    let occupied = enrollments::count_occupied(&mut *conn, session.id).await?;
    let status = derive_session_status(session.status, occupied, session.capacity);

    if status != session.status {
        sessions::store_status(&mut *conn, session.id, status, now).await?;
        info!(
            session.id = session.id,
            ledger.occupied = occupied,
            ledger.capacity = session.capacity,
            session.from = %session.status,
            session.to = %status,
            "Session status re-derived"
        );
    }

    Ok(Occupancy { occupied, status })
}
