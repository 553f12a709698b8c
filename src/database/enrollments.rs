// ABOUTME: Enrollment storage: schema, filtered reads and in-transaction mutations
// ABOUTME: Occupancy is always an aggregate over enrollment rows, never a stored counter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use super::mappers::{parse_enrollment, ENROLLMENT_COLUMNS};
use super::Database;
use crate::constants::limits::MAX_ENROLLMENT_LIST;
use crate::errors::{AppError, AppResult};
use crate::models::{ContactDetails, Enrollment, EnrollmentStatus};

/// Occupancy predicate shared by every seat count
const OCCUPYING_STATUSES: &str = "status IN ('payment_confirmed', 'registered')";

/// Filters for the admin enrollment listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    /// Only enrollments for this session
    pub session_id: Option<i64>,
    /// Only enrollments in this status
    pub status: Option<EnrollmentStatus>,
    /// Only enrollments for this course
    pub course_slug: Option<String>,
}

impl Database {
    /// Create the enrollments table and its indexes
    pub(super) async fn migrate_enrollments(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS enrollments (
                id TEXT PRIMARY KEY,
                session_id INTEGER NOT NULL REFERENCES sessions(id),
                course_slug TEXT NOT NULL,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                id_card TEXT,
                address TEXT,
                gdpr_consent INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'enrolled'
                    CHECK (status IN ('enrolled', 'payment_confirmed', 'registered', 'cancelled')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create enrollments table: {e}")))?;

        // At most one non-cancelled enrollment per (session, email)
        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_enrollments_active_email
            ON enrollments(session_id, email) WHERE status != 'cancelled'
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create enrollments index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_enrollments_session_status ON enrollments(session_id, status)",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create enrollments index: {e}")))?;

        Ok(())
    }

    /// Get an enrollment by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_enrollment(&self, enrollment_id: Uuid) -> AppResult<Option<Enrollment>> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?1"
        ))
        .bind(enrollment_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to get enrollment {enrollment_id}: {e}"))
        })?;

        row.as_ref().map(parse_enrollment).transpose()
    }

    /// List enrollments matching `filter`, newest first, capped at a fixed maximum
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_enrollments(&self, filter: &EnrollmentFilter) -> AppResult<Vec<Enrollment>> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE 1 = 1"
        ));
        if let Some(session_id) = filter.session_id {
            query.push(" AND session_id = ").push_bind(session_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(course_slug) = &filter.course_slug {
            query.push(" AND course_slug = ").push_bind(course_slug);
        }
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(MAX_ENROLLMENT_LIST);

        let rows = query
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list enrollments: {e}")))?;

        rows.iter().map(parse_enrollment).collect()
    }

    /// Whether `email` holds a non-cancelled enrollment for the session
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn has_active_enrollment(&self, session_id: i64, email: &str) -> AppResult<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE session_id = ?1 AND email = ?2 AND status != 'cancelled'",
        )
        .bind(session_id)
        .bind(email)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(count > 0)
    }
}

fn to_seat_count(count: i64) -> AppResult<u32> {
    u32::try_from(count).map_err(|_| AppError::internal(format!("Seat count out of range: {count}")))
}

/// Count the seats held in a session inside the current transaction
pub async fn count_occupied(conn: &mut SqliteConnection, session_id: i64) -> AppResult<u32> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM enrollments WHERE session_id = ?1 AND {OCCUPYING_STATUSES}"
    ))
    .bind(session_id)
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    to_seat_count(count)
}

/// Whether another non-cancelled enrollment holds `email` in the session
pub async fn email_taken(
    conn: &mut SqliteConnection,
    session_id: i64,
    email: &str,
    except: Option<Uuid>,
) -> AppResult<bool> {
    let (count,): (i64,) = sqlx::query_as(
        r"
        SELECT COUNT(*) FROM enrollments
        WHERE session_id = ?1 AND email = ?2 AND status != 'cancelled'
          AND (?3 IS NULL OR id != ?3)
        ",
    )
    .bind(session_id)
    .bind(email)
    .bind(except.map(|id| id.to_string()))
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    Ok(count > 0)
}

/// Take the write lock and read the enrollment row
///
/// Used as the first statement of transition transactions; see
/// [`super::sessions::lock_session`].
pub async fn lock_enrollment(
    conn: &mut SqliteConnection,
    enrollment_id: Uuid,
) -> AppResult<Option<Enrollment>> {
    let row = sqlx::query(&format!(
        "UPDATE enrollments SET status = status WHERE id = ?1 RETURNING {ENROLLMENT_COLUMNS}"
    ))
    .bind(enrollment_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(AppError::from)?;

    row.as_ref().map(parse_enrollment).transpose()
}

/// Insert a new enrollment row
pub async fn insert_enrollment(conn: &mut SqliteConnection, enrollment: &Enrollment) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO enrollments (id, session_id, course_slug, full_name, email, phone, id_card,
                                 address, gdpr_consent, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ",
    )
    .bind(enrollment.id.to_string())
    .bind(enrollment.session_id)
    .bind(&enrollment.course_slug)
    .bind(&enrollment.contact.full_name)
    .bind(&enrollment.contact.email)
    .bind(&enrollment.contact.phone)
    .bind(&enrollment.contact.id_card)
    .bind(&enrollment.contact.address)
    .bind(enrollment.gdpr_consent)
    .bind(enrollment.status.as_str())
    .bind(enrollment.created_at)
    .bind(enrollment.updated_at)
    .execute(conn)
    .await
    .map_err(AppError::from)?;
    Ok(())
}

/// Persist an enrollment's status
pub async fn store_status(
    conn: &mut SqliteConnection,
    enrollment_id: Uuid,
    status: EnrollmentStatus,
    now: DateTime<Utc>,
) -> AppResult<Enrollment> {
    let row = sqlx::query(&format!(
        "UPDATE enrollments SET status = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {ENROLLMENT_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(now)
    .bind(enrollment_id.to_string())
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    parse_enrollment(&row)
}

/// Replace an enrollment's contact details
pub async fn store_contact(
    conn: &mut SqliteConnection,
    enrollment_id: Uuid,
    contact: &ContactDetails,
    now: DateTime<Utc>,
) -> AppResult<Enrollment> {
    let row = sqlx::query(&format!(
        r"
        UPDATE enrollments
        SET full_name = ?1, email = ?2, phone = ?3, id_card = ?4, address = ?5, updated_at = ?6
        WHERE id = ?7
        RETURNING {ENROLLMENT_COLUMNS}
        "
    ))
    .bind(&contact.full_name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.id_card)
    .bind(&contact.address)
    .bind(now)
    .bind(enrollment_id.to_string())
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    parse_enrollment(&row)
}

/// Remove an enrollment row; its payment goes with it
pub async fn delete_row(conn: &mut SqliteConnection, enrollment_id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM enrollments WHERE id = ?1")
        .bind(enrollment_id.to_string())
        .execute(conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}
