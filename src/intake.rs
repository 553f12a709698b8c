// ABOUTME: Enrollment intake validation and normalization ahead of the ledger
// ABOUTME: Checks required fields, email, phone and ID card formats, consent and payment amount
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Enrollment Intake
//!
//! Request bodies arrive with every field optional so that a missing field is
//! reported as `MISSING_REQUIRED_FIELD` instead of a deserialization failure.
//! Validation never touches storage.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::constants::intake::{DEFAULT_CURRENCY, ID_CARD_LENGTH, MAX_NAME_LENGTH, PHONE_PATTERN};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{ContactDetails, NewEnrollment};

/// Public enrollment form submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    /// Course the student is enrolling in
    pub course_slug: Option<String>,
    /// Session within the course
    pub session_id: Option<i64>,
    /// Student full name
    pub student_name: Option<String>,
    /// Student email
    pub student_email: Option<String>,
    /// Student phone, `+355` followed by nine digits
    pub student_phone: Option<String>,
    /// National ID card number
    pub student_id_card: Option<String>,
    /// Postal address
    pub student_address: Option<String>,
    /// Amount due, defaults to zero
    pub amount: Option<Decimal>,
    /// Currency code, defaults to EUR
    pub currency: Option<String>,
    /// Data processing consent
    pub gdpr_consent: Option<bool>,
}

impl CreateEnrollmentRequest {
    /// Validate and normalize into admission input
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field
    pub fn validate(self) -> AppResult<NewEnrollment> {
        let course_slug = required_text(self.course_slug, "courseSlug")?;
        let session_id = self
            .session_id
            .ok_or_else(|| AppError::missing_field("sessionId"))?;
        if session_id <= 0 {
            return Err(AppError::invalid_input(format!(
                "sessionId must be a positive integer, got {session_id}"
            )));
        }

        let contact = validate_contact(
            self.student_name,
            self.student_email,
            self.student_phone,
            self.student_id_card,
            self.student_address,
            ("studentName", "studentEmail"),
        )?;

        if self.gdpr_consent != Some(true) {
            return Err(AppError::invalid_input(
                "GDPR consent is required to enroll",
            ));
        }

        Ok(NewEnrollment {
            session_id,
            course_slug,
            contact,
            gdpr_consent: true,
            amount: validate_amount(self.amount)?,
            currency: normalize_currency(self.currency)?,
        })
    }
}

/// Admin edit of an enrollment's contact details
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    /// Full name
    pub full_name: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Phone
    pub phone: Option<String>,
    /// National ID card number
    pub id_card: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

impl UpdateContactRequest {
    /// Validate with the same rules as intake
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field
    pub fn validate(self) -> AppResult<ContactDetails> {
        validate_contact(
            self.full_name,
            self.email,
            self.phone,
            self.id_card,
            self.address,
            ("fullName", "email"),
        )
    }
}

fn validate_contact(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    id_card: Option<String>,
    address: Option<String>,
    (name_field, email_field): (&str, &str),
) -> AppResult<ContactDetails> {
    let full_name = required_text(name, name_field)?;
    if full_name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("{name_field} must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    let email = normalize_email(&required_text(email, email_field)?)?;

    Ok(ContactDetails {
        full_name,
        email,
        phone: optional_text(phone).map(|p| normalize_phone(&p)).transpose()?,
        id_card: optional_text(id_card)
            .map(|card| normalize_id_card(&card))
            .transpose()?,
        address: optional_text(address),
    })
}

fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    optional_text(value).ok_or_else(|| AppError::missing_field(field))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Normalize an email to trimmed lowercase and check its shape
///
/// # Errors
///
/// Returns `InvalidFormat` unless the value is `local@domain` with both parts
/// non-empty and no whitespace
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);

    if well_formed {
        Ok(email)
    } else {
        Err(AppError::invalid_format(format!("Invalid email address: {raw}")))
    }
}

fn phone_pattern() -> Option<&'static Regex> {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).ok()).as_ref()
}

/// Normalize a phone number, dropping inner spaces
///
/// # Errors
///
/// Returns `InvalidFormat` unless the number is `+355` followed by nine digits
pub fn normalize_phone(raw: &str) -> AppResult<String> {
    let phone: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let pattern =
        phone_pattern().ok_or_else(|| AppError::internal("Phone pattern failed to compile"))?;

    if pattern.is_match(&phone) {
        Ok(phone)
    } else {
        Err(AppError::invalid_format(
            "Phone number must be +355 followed by 9 digits",
        ))
    }
}

/// Normalize an ID card number to upper case
///
/// # Errors
///
/// Returns `InvalidFormat` unless the value is exactly ten alphanumeric characters
pub fn normalize_id_card(raw: &str) -> AppResult<String> {
    let card = raw.trim().to_uppercase();
    if card.chars().count() == ID_CARD_LENGTH && card.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(card)
    } else {
        Err(AppError::invalid_format(format!(
            "ID card number must be exactly {ID_CARD_LENGTH} letters or digits"
        )))
    }
}

fn validate_amount(amount: Option<Decimal>) -> AppResult<Decimal> {
    let amount = amount.unwrap_or(Decimal::ZERO);
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("amount must not be negative, got {amount}"),
        ));
    }
    Ok(amount)
}

fn normalize_currency(currency: Option<String>) -> AppResult<String> {
    let Some(raw) = optional_text(currency) else {
        return Ok(DEFAULT_CURRENCY.to_owned());
    };
    if raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(raw.to_ascii_uppercase())
    } else {
        Err(AppError::invalid_format(format!(
            "currency must be a three-letter code, got {raw}"
        )))
    }
}
