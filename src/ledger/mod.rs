// ABOUTME: Enrollment/capacity ledger: the single write path for seat-affecting changes
// ABOUTME: Admission, status transitions, deletion and session capacity edits in one transaction each
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Enrollment Ledger
//!
//! Owns the invariant that `payment_confirmed` + `registered` enrollments in a
//! session never exceed its capacity, and keeps the session's persisted status
//! equal to the status derived from that count.
//!
//! Every operation runs as one storage transaction whose first statement takes
//! the write lock (see [`crate::database::transactions`]). Occupancy is recounted
//! inside that transaction, so check-then-act sequences on the same session
//! cannot interleave. Lock contention surfaces as `StorageConflict` and is
//! retried a bounded number of times before reaching the caller.

/// Occupancy recomputation helpers
pub mod occupancy;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::database::{enrollments, payments, retry_transaction, sessions, Database};
use crate::errors::{AppError, AppResult, LedgerError};
use crate::models::{
    derive_session_status, ContactDetails, Enrollment, EnrollmentStatus, NewEnrollment, Payment,
    PaymentStatus, Session, SessionAvailability, SessionStatus, SessionUpdate,
};

pub use occupancy::Occupancy;

/// Result of a successful admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The new enrollment, in `enrolled` state
    pub enrollment: Enrollment,
    /// Seats still free after admission
    pub available_spots: u32,
}

/// Result of a successful status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The enrollment after the transition
    pub enrollment: Enrollment,
    /// Status before the transition
    pub previous_status: EnrollmentStatus,
    /// Payment after the transition, when the transition touched it
    pub payment: Option<Payment>,
    /// Seat accounting for the owning session after the transition
    pub occupancy: Occupancy,
}

/// Admission attempt outcome; a full session still commits its status change
enum AdmissionOutcome {
    Admitted(Admission),
    Full { capacity: u32 },
}

/// The enrollment/capacity ledger
#[derive(Clone)]
pub struct EnrollmentLedger {
    database: Arc<Database>,
    max_retries: u32,
}

impl EnrollmentLedger {
    /// Create a ledger over `database`
    #[must_use]
    pub const fn new(database: Arc<Database>, config: LedgerConfig) -> Self {
        Self {
            database,
            max_retries: config.max_retries,
        }
    }

    /// The underlying database
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Admit a new enrollment against the session's remaining capacity
    ///
    /// The session must exist, belong to the requested course, be published and
    /// be open for registration. When the session turns out to be full, its
    /// status is persisted as `fully_booked` before `SessionFull` is returned.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `CourseMismatch`, `SessionNotOpen`,
    /// `DuplicateEnrollment`, `SessionFull`, or `StorageConflict` once retries
    /// are exhausted
    pub async fn admit_enrollment(&self, request: &NewEnrollment) -> AppResult<Admission> {
        let outcome = retry_transaction(|| self.try_admit(request), self.max_retries).await?;

        match outcome {
            AdmissionOutcome::Admitted(admission) => {
                info!(
                    enrollment.id = %admission.enrollment.id,
                    session.id = request.session_id,
                    ledger.available_spots = admission.available_spots,
                    "Enrollment admitted"
                );
                Ok(admission)
            }
            AdmissionOutcome::Full { capacity } => {
                warn!(
                    session.id = request.session_id,
                    ledger.capacity = capacity,
                    "Admission rejected, session is full"
                );
                Err(LedgerError::SessionFull {
                    session_id: request.session_id,
                    capacity,
                }
                .into())
            }
        }
    }

    async fn try_admit(&self, request: &NewEnrollment) -> AppResult<AdmissionOutcome> {
        let now = Utc::now();
        let mut guard = self.database.begin().await?;

        let session = sessions::lock_session(guard.executor()?, request.session_id)
            .await?
            .ok_or(LedgerError::session_not_found(request.session_id))?;

        if session.course_slug != request.course_slug {
            return Err(LedgerError::CourseMismatch {
                session_id: session.id,
                course_slug: request.course_slug.clone(),
            }
            .into());
        }
        if !session.accepts_enrollments() {
            if session.is_published && session.status == SessionStatus::FullyBooked {
                return Ok(AdmissionOutcome::Full {
                    capacity: session.capacity,
                });
            }
            return Err(LedgerError::SessionNotOpen {
                session_id: session.id,
                status: session.status,
                is_published: session.is_published,
            }
            .into());
        }

        if enrollments::email_taken(
            guard.executor()?,
            session.id,
            &request.contact.email,
            None,
        )
        .await?
        {
            return Err(LedgerError::duplicate(session.id, &request.contact.email).into());
        }

        let occupied = enrollments::count_occupied(guard.executor()?, session.id).await?;
        if occupied >= session.capacity {
            if session.status != SessionStatus::FullyBooked {
                sessions::store_status(
                    guard.executor()?,
                    session.id,
                    SessionStatus::FullyBooked,
                    now,
                )
                .await?;
            }
            guard.commit().await?;
            return Ok(AdmissionOutcome::Full {
                capacity: session.capacity,
            });
        }

        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            session_id: session.id,
            course_slug: session.course_slug.clone(),
            contact: request.contact.clone(),
            gdpr_consent: request.gdpr_consent,
            status: EnrollmentStatus::Enrolled,
            created_at: now,
            updated_at: now,
        };
        enrollments::insert_enrollment(guard.executor()?, &enrollment).await?;
        payments::insert_pending(
            guard.executor()?,
            enrollment.id,
            request.amount,
            &request.currency,
            now,
        )
        .await?;

        // The new row holds no seat, so this only confirms registration_open
        let occupancy = occupancy::reconcile(guard.executor()?, &session, now).await?;
        guard.commit().await?;

        Ok(AdmissionOutcome::Admitted(Admission {
            enrollment,
            available_spots: session.capacity.saturating_sub(occupancy.occupied),
        }))
    }

    /// Move an enrollment to `target`, applying payment side effects and
    /// re-deriving the owning session's status
    ///
    /// # Errors
    ///
    /// `EnrollmentNotFound`, `InvalidTransition`, `CapacityExceeded` when the
    /// target needs a seat and none is free, `DuplicateEnrollment` when a
    /// restore collides with another active enrollment for the same email, or
    /// `StorageConflict` once retries are exhausted
    pub async fn transition_status(
        &self,
        enrollment_id: Uuid,
        target: EnrollmentStatus,
        actor: &str,
    ) -> AppResult<Transition> {
        let transition = retry_transaction(
            || self.try_transition(enrollment_id, target, actor),
            self.max_retries,
        )
        .await?;

        info!(
            enrollment.id = %enrollment_id,
            enrollment.from = %transition.previous_status,
            enrollment.to = %target,
            ledger.occupied = transition.occupancy.occupied,
            actor = %actor,
            "Enrollment status changed"
        );
        Ok(transition)
    }

    async fn try_transition(
        &self,
        enrollment_id: Uuid,
        target: EnrollmentStatus,
        actor: &str,
    ) -> AppResult<Transition> {
        let now = Utc::now();
        let mut guard = self.database.begin().await?;

        let current = enrollments::lock_enrollment(guard.executor()?, enrollment_id)
            .await?
            .ok_or(LedgerError::enrollment_not_found(enrollment_id))?;
        let previous_status = current.status;

        if !previous_status.can_transition_to(target) {
            return Err(LedgerError::invalid_transition(previous_status, target).into());
        }

        let session = load_session(&mut guard, current.session_id).await?;

        if previous_status.requires_free_seat(target) {
            let occupied = enrollments::count_occupied(guard.executor()?, session.id).await?;
            if occupied >= session.capacity {
                return Err(LedgerError::CapacityExceeded {
                    session_id: session.id,
                    capacity: session.capacity,
                    occupied,
                }
                .into());
            }
        }

        if previous_status == EnrollmentStatus::Cancelled
            && enrollments::email_taken(
                guard.executor()?,
                session.id,
                &current.contact.email,
                Some(enrollment_id),
            )
            .await?
        {
            return Err(LedgerError::duplicate(session.id, &current.contact.email).into());
        }

        let enrollment =
            enrollments::store_status(guard.executor()?, enrollment_id, target, now).await?;

        let payment = match PaymentStatus::for_enrollment_status(target) {
            Some(payment_status) => Some(
                payments::upsert_status(
                    guard.executor()?,
                    enrollment_id,
                    payment_status,
                    actor,
                    now,
                )
                .await?,
            ),
            None => None,
        };

        let occupancy = occupancy::reconcile(guard.executor()?, &session, now).await?;
        guard.commit().await?;

        Ok(Transition {
            enrollment,
            previous_status,
            payment,
            occupancy,
        })
    }

    /// Hard-delete an enrollment and its payment, re-deriving the session status
    ///
    /// # Errors
    ///
    /// `EnrollmentNotFound`, or `StorageConflict` once retries are exhausted
    pub async fn delete_enrollment(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        let (removed, occupancy) =
            retry_transaction(|| self.try_delete(enrollment_id), self.max_retries).await?;

        info!(
            enrollment.id = %enrollment_id,
            session.id = removed.session_id,
            enrollment.status = %removed.status,
            ledger.occupied = occupancy.occupied,
            "Enrollment deleted"
        );
        Ok(removed)
    }

    async fn try_delete(&self, enrollment_id: Uuid) -> AppResult<(Enrollment, Occupancy)> {
        let now = Utc::now();
        let mut guard = self.database.begin().await?;

        let removed = enrollments::lock_enrollment(guard.executor()?, enrollment_id)
            .await?
            .ok_or(LedgerError::enrollment_not_found(enrollment_id))?;
        let session = load_session(&mut guard, removed.session_id).await?;

        enrollments::delete_row(guard.executor()?, enrollment_id).await?;
        let occupancy = occupancy::reconcile(guard.executor()?, &session, now).await?;
        guard.commit().await?;

        Ok((removed, occupancy))
    }

    /// Replace an enrollment's contact details
    ///
    /// # Errors
    ///
    /// `EnrollmentNotFound`, or `DuplicateEnrollment` when the new email is
    /// already active in the session
    pub async fn update_contact(
        &self,
        enrollment_id: Uuid,
        contact: &ContactDetails,
    ) -> AppResult<Enrollment> {
        let enrollment = retry_transaction(
            || self.try_update_contact(enrollment_id, contact),
            self.max_retries,
        )
        .await?;

        debug!(enrollment.id = %enrollment_id, "Enrollment contact details updated");
        Ok(enrollment)
    }

    async fn try_update_contact(
        &self,
        enrollment_id: Uuid,
        contact: &ContactDetails,
    ) -> AppResult<Enrollment> {
        let mut guard = self.database.begin().await?;

        let current = enrollments::lock_enrollment(guard.executor()?, enrollment_id)
            .await?
            .ok_or(LedgerError::enrollment_not_found(enrollment_id))?;

        if current.status != EnrollmentStatus::Cancelled
            && enrollments::email_taken(
                guard.executor()?,
                current.session_id,
                &contact.email,
                Some(enrollment_id),
            )
            .await?
        {
            return Err(LedgerError::duplicate(current.session_id, &contact.email).into());
        }

        let enrollment =
            enrollments::store_contact(guard.executor()?, enrollment_id, contact, Utc::now())
                .await?;
        guard.commit().await?;
        Ok(enrollment)
    }

    /// Apply an admin edit to a session in one transaction
    ///
    /// Capacity may not drop below the seats already held. Admins may set
    /// `coming_soon` or `registration_open`; the persisted status is then
    /// re-derived from occupancy. A rejected capacity or status leaves the
    /// descriptive fields untouched as well.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `StatusNotAssignable`, `CapacityBelowOccupancy`, or
    /// `StorageConflict` once retries are exhausted
    pub async fn update_session(
        &self,
        session_id: i64,
        update: &SessionUpdate,
    ) -> AppResult<Session> {
        if let Some(requested) = update.status.filter(|s| !s.is_admin_assignable()) {
            return Err(LedgerError::StatusNotAssignable { status: requested }.into());
        }

        let session = retry_transaction(
            || self.try_update_session(session_id, update),
            self.max_retries,
        )
        .await?;

        info!(
            session.id = session_id,
            ledger.capacity = session.capacity,
            session.status = %session.status,
            "Session updated"
        );
        Ok(session)
    }

    async fn try_update_session(
        &self,
        session_id: i64,
        update: &SessionUpdate,
    ) -> AppResult<Session> {
        let now = Utc::now();
        let mut guard = self.database.begin().await?;

        let session = sessions::lock_session(guard.executor()?, session_id)
            .await?
            .ok_or(LedgerError::session_not_found(session_id))?;

        if update.affects_occupancy() {
            let occupied = enrollments::count_occupied(guard.executor()?, session_id).await?;

            let new_capacity = update.capacity.unwrap_or(session.capacity);
            if new_capacity < occupied {
                return Err(LedgerError::CapacityBelowOccupancy {
                    session_id,
                    requested: new_capacity,
                    occupied,
                }
                .into());
            }

            let new_status = derive_session_status(
                update.status.unwrap_or(session.status),
                occupied,
                new_capacity,
            );
            sessions::store_capacity_and_status(
                guard.executor()?,
                session_id,
                new_capacity,
                new_status,
                now,
            )
            .await?;
        }

        let updated = sessions::store_details(guard.executor()?, session_id, update, now).await?;
        guard.commit().await?;

        Ok(updated)
    }

    /// Read a session's seat accounting from one consistent snapshot
    ///
    /// Never writes; repeated calls without intervening writes agree.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, or a storage error
    pub async fn availability(&self, session_id: i64) -> AppResult<SessionAvailability> {
        let mut guard = self.database.begin().await?;

        let session = sessions::find_session(guard.executor()?, session_id)
            .await?
            .ok_or(LedgerError::session_not_found(session_id))?;
        let occupied = enrollments::count_occupied(guard.executor()?, session_id).await?;
        guard.rollback().await?;

        Ok(SessionAvailability::new(
            session.id,
            session.capacity,
            occupied,
            session.status,
        ))
    }
}

async fn load_session(
    guard: &mut crate::database::SqliteTransactionGuard<'static>,
    session_id: i64,
) -> AppResult<Session> {
    sessions::find_session(guard.executor()?, session_id)
        .await?
        .ok_or_else(|| AppError::from(LedgerError::session_not_found(session_id)))
}
