// ABOUTME: Unified error handling with standard error codes and HTTP status mapping
// ABOUTME: Defines AppError, ErrorCode, ErrorResponse and storage error classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Unified Error Handling System
//!
//! Every fallible operation in the server returns [`AppResult`]. Domain errors
//! (see [`ledger::LedgerError`]) convert into [`AppError`], which carries an
//! [`ErrorCode`] that fixes the HTTP status the API layer responds with.

/// Enrollment ledger domain errors
pub mod ledger;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use ledger::LedgerError;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// The provided input is invalid
    InvalidInput = 3000,
    /// A required field is missing
    MissingRequiredField = 3001,
    /// The data format is invalid
    InvalidFormat = 3002,
    /// The value is outside the acceptable range
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// The requested resource was not found
    ResourceNotFound = 4000,
    /// A resource with this identifier already exists
    ResourceAlreadyExists = 4001,
    /// The resource is referenced and cannot be modified
    ResourceLocked = 4002,

    // Enrollment ledger (7000-7999)
    /// Enrollee already holds a non-cancelled enrollment for the session
    DuplicateEnrollment = 7000,
    /// No seats remain at admission time
    SessionFull = 7001,
    /// No seats remain for a transition into a seat-consuming state
    CapacityExceeded = 7002,
    /// Requested status change is not reachable from the current state
    InvalidTransition = 7003,
    /// Session is unpublished or not yet open for registration
    SessionNotOpen = 7004,

    // Configuration (6000-6999)
    /// Configuration error encountered
    ConfigError = 6000,
    /// Required configuration is missing
    ConfigMissing = 6001,
    /// Configuration is invalid
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// An internal server error occurred
    InternalError = 9000,
    /// Database operation failed
    DatabaseError = 9001,
    /// Concurrent storage contention; the operation may be retried
    StorageConflict = 9002,
    /// Data serialization/deserialization failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange
            | Self::DuplicateEnrollment
            | Self::SessionFull
            | Self::CapacityExceeded
            | Self::InvalidTransition
            | Self::SessionNotOpen => 400,

            Self::ResourceNotFound => 404,

            Self::ResourceAlreadyExists | Self::ResourceLocked => 409,

            Self::StorageConflict => 503,

            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError
            | Self::ConfigMissing
            | Self::ConfigInvalid => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ResourceLocked => "The resource is referenced and cannot be modified",
            Self::DuplicateEnrollment => "An active enrollment already exists for this session",
            Self::SessionFull => "The session is fully booked",
            Self::CapacityExceeded => "No seats remain in the session",
            Self::InvalidTransition => "The requested status change is not allowed",
            Self::SessionNotOpen => "The session is not open for enrollment",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageConflict => "The storage is busy with a concurrent update, retry later",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether a caller may retry the same request unchanged
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageConflict)
    }
}

/// Unified error type for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Request ID for correlating logs, when known
    pub request_id: Option<String>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: None,
        }
    }

    /// Attach a request ID
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether this error reports transient storage contention
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
    }

    /// Invalid format
    #[must_use]
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Retryable storage contention
    #[must_use]
    pub fn storage_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageConflict, message)
    }

    /// Resource is referenced and cannot be removed
    #[must_use]
    pub fn resource_locked(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceLocked, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`; mirrors the `success` flag of successful responses
    pub success: bool,
    /// Error details
    pub error: ErrorResponseDetails,
}

/// Error details carried by [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Whether the client may retry unchanged
    pub retryable: bool,
    /// Request ID, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            success: false,
            error: ErrorResponseDetails {
                retryable: error.is_retryable(),
                code: error.code,
                message: error.message,
                request_id: error.request_id,
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string())
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error.code = ?self.code, error.message = %self.message, "Request failed");
        } else {
            tracing::debug!(error.code = ?self.code, error.message = %self.message, "Request rejected");
        }

        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}

/// SQLite primary/extended result codes that signal lock contention
#[cfg(feature = "database-errors")]
const SQLITE_CONTENTION_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            sqlx::Error::PoolTimedOut => {
                Self::storage_conflict("Timed out waiting for a database connection")
            }
            sqlx::Error::Database(db_error) => {
                let is_contention = db_error
                    .code()
                    .is_some_and(|code| SQLITE_CONTENTION_CODES.contains(&code.as_ref()));
                if is_contention {
                    Self::storage_conflict(db_error.message().to_owned())
                } else if db_error.is_unique_violation() {
                    Self::new(ErrorCode::ResourceAlreadyExists, db_error.message().to_owned())
                } else {
                    Self::database(error.to_string())
                }
            }
            _ => Self::database(error.to_string()),
        }
    }
}
