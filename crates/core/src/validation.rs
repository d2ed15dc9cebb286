//! Local field validators shared by the portal's forms.
//!
//! Every check here runs before a form touches the gateway, so a rejected
//! submission never produces a remote call.

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::types::Date;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Earliest identity-document issue date the registration form accepts.
pub fn earliest_issue_date() -> Date {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Validate that a required text field is not blank.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Validate that a required selection (date, enum choice) was made.
///
/// `message` is shown verbatim, matching the form's own prompt.
pub fn validate_selected<'a, T>(value: &'a Option<T>, message: &str) -> Result<&'a T, CoreError> {
    value
        .as_ref()
        .ok_or_else(|| CoreError::Validation(message.to_string()))
}

/// Validate that an appointment is not booked for a day that already passed.
pub fn validate_appointment_date(date: Date, today: Date) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::Validation(
            "Appointment date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Validate an identity-document issue date: not in the future and not
/// before [`earliest_issue_date`].
pub fn validate_issue_date(date: Date, today: Date) -> Result<(), CoreError> {
    if date > today {
        return Err(CoreError::Validation(
            "Issue date cannot be in the future".to_string(),
        ));
    }
    if date < earliest_issue_date() {
        return Err(CoreError::Validation(
            "Issue date cannot be before 1900-01-01".to_string(),
        ));
    }
    Ok(())
}

/// Validate that an email address is present and syntactically valid.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    validate_required("Email", email)?;
    if !email.trim().validate_email() {
        return Err(CoreError::Validation(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a password meets the minimum length.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
