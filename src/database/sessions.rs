// ABOUTME: Course session storage: schema, scheduling CRUD and in-transaction locking
// ABOUTME: Session rows carry capacity and the persisted, ledger-derived status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::mappers::{parse_session, SESSION_COLUMNS};
use super::Database;
use crate::constants::limits::MAX_SESSION_LIST;
use crate::errors::{AppError, AppResult};
use crate::models::{derive_session_status, NewSession, Session, SessionStatus, SessionUpdate};

impl Database {
    /// Create the sessions table
    pub(super) async fn migrate_sessions(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_slug TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                start_date TEXT,
                end_date TEXT,
                mode TEXT,
                price TEXT,
                capacity INTEGER NOT NULL DEFAULT 0 CHECK (capacity >= 0),
                status TEXT NOT NULL DEFAULT 'coming_soon'
                    CHECK (status IN ('coming_soon', 'registration_open', 'fully_booked')),
                is_published INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create sessions table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_course ON sessions(course_slug, start_date)",
        )
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create sessions index: {e}")))?;

        Ok(())
    }

    /// Schedule a new session
    ///
    /// A session opened with no capacity is stored `fully_booked` straight away.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_session(&self, new_session: &NewSession) -> AppResult<Session> {
        let now = Utc::now();
        let status = derive_session_status(new_session.status, 0, new_session.capacity);

        let row = sqlx::query(&format!(
            r"
            INSERT INTO sessions (course_slug, title, description, start_date, end_date, mode,
                                  price, capacity, status, is_published, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            RETURNING {SESSION_COLUMNS}
            "
        ))
        .bind(&new_session.course_slug)
        .bind(&new_session.title)
        .bind(&new_session.description)
        .bind(new_session.start_date)
        .bind(new_session.end_date)
        .bind(&new_session.mode)
        .bind(new_session.price.map(|price| price.to_string()))
        .bind(i64::from(new_session.capacity))
        .bind(status.as_str())
        .bind(new_session.is_published)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create session: {e}")))?;

        parse_session(&row)
    }

    /// Get a session by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_session(&self, session_id: i64) -> AppResult<Option<Session>> {
        let mut conn = self.pool().acquire().await.map_err(AppError::from)?;
        find_session(&mut *conn, session_id).await
    }

    /// List a course's sessions ordered by start date, then creation
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_course_sessions(
        &self,
        course_slug: &str,
        published_only: bool,
    ) -> AppResult<Vec<Session>> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE course_slug = "
        ));
        query.push_bind(course_slug);
        if published_only {
            query.push(" AND is_published = 1");
        }
        query.push(" ORDER BY start_date IS NULL, start_date, created_at, id LIMIT ");
        query.push_bind(MAX_SESSION_LIST);

        let rows = query
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to list sessions for {course_slug}: {e}"))
            })?;

        rows.iter().map(parse_session).collect()
    }

    /// Delete a session that no enrollment references
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown session and `ResourceLocked`
    /// while any enrollment, cancelled or not, points at it
    pub async fn delete_session(&self, session_id: i64) -> AppResult<()> {
        let mut guard = self.begin().await?;

        if lock_session(guard.executor()?, session_id).await?.is_none() {
            return Err(AppError::not_found(format!("Session {session_id}")));
        }

        let (referencing,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE session_id = ?1")
                .bind(session_id)
                .fetch_one(guard.executor()?)
                .await
                .map_err(AppError::from)?;
        if referencing > 0 {
            return Err(AppError::resource_locked(format!(
                "Session {session_id} has {referencing} enrollment(s) and cannot be deleted"
            )));
        }

        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(session_id)
            .execute(guard.executor()?)
            .await
            .map_err(AppError::from)?;

        guard.commit().await
    }
}

/// Read a session row on an existing connection
pub async fn find_session(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> AppResult<Option<Session>> {
    let row = sqlx::query(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
    ))
    .bind(session_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get session {session_id}: {e}")))?;

    row.as_ref().map(parse_session).transpose()
}

/// Take the write lock and read the session row
///
/// The no-op `UPDATE` is the first statement of the transaction, so the
/// `SQLite` write lock is held before occupancy is counted.
pub async fn lock_session(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> AppResult<Option<Session>> {
    let row = sqlx::query(&format!(
        "UPDATE sessions SET status = status WHERE id = ?1 RETURNING {SESSION_COLUMNS}"
    ))
    .bind(session_id)
    .fetch_optional(conn)
    .await
    .map_err(AppError::from)?;

    row.as_ref().map(parse_session).transpose()
}

/// Persist a session's status
pub async fn store_status(
    conn: &mut SqliteConnection,
    session_id: i64,
    status: SessionStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query("UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status.as_str())
        .bind(now)
        .bind(session_id)
        .execute(conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

/// Persist a session's capacity together with its re-derived status
pub async fn store_capacity_and_status(
    conn: &mut SqliteConnection,
    session_id: i64,
    capacity: u32,
    status: SessionStatus,
    now: DateTime<Utc>,
) -> AppResult<Session> {
    let row = sqlx::query(&format!(
        r"
        UPDATE sessions SET capacity = ?1, status = ?2, updated_at = ?3
        WHERE id = ?4
        RETURNING {SESSION_COLUMNS}
        "
    ))
    .bind(i64::from(capacity))
    .bind(status.as_str())
    .bind(now)
    .bind(session_id)
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    parse_session(&row)
}

/// Persist the descriptive fields of a session update
///
/// Capacity and status are left to the ledger's occupancy checks.
pub async fn store_details(
    conn: &mut SqliteConnection,
    session_id: i64,
    update: &SessionUpdate,
    now: DateTime<Utc>,
) -> AppResult<Session> {
    let row = sqlx::query(&format!(
        r"
        UPDATE sessions SET
            title = COALESCE(?1, title),
            description = COALESCE(?2, description),
            start_date = COALESCE(?3, start_date),
            end_date = COALESCE(?4, end_date),
            mode = COALESCE(?5, mode),
            price = COALESCE(?6, price),
            is_published = COALESCE(?7, is_published),
            updated_at = ?8
        WHERE id = ?9
        RETURNING {SESSION_COLUMNS}
        "
    ))
    .bind(&update.title)
    .bind(&update.description)
    .bind(update.start_date)
    .bind(update.end_date)
    .bind(&update.mode)
    .bind(update.price.map(|price| price.to_string()))
    .bind(update.is_published)
    .bind(now)
    .bind(session_id)
    .fetch_one(conn)
    .await
    .map_err(AppError::from)?;

    parse_session(&row)
}
