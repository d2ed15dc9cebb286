//! Patient self-registration form.

use medportal_core::error::CoreError;
use medportal_core::profile::{DocumentType, ProfileMetadata};
use medportal_core::types::Date;
use medportal_core::validation::{
    validate_email, validate_issue_date, validate_password, validate_required, validate_selected,
};
use medportal_gateway::Credentials;

use crate::error::AppResult;
use crate::session::{Registration, SessionManager};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub issue_date: Option<Date>,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Check every field and build the sign-up payload.
    pub fn validate(&self, today: Date) -> Result<(Credentials, ProfileMetadata), CoreError> {
        let issue_date =
            *validate_selected(&self.issue_date, "Please select the document issue date")?;
        validate_issue_date(issue_date, today)?;
        validate_required("Full name", &self.full_name)?;
        validate_required("Document number", &self.document_number)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;

        let credentials = Credentials::new(self.email.trim(), self.password.clone());
        let metadata = ProfileMetadata {
            full_name: self.full_name.trim().to_string(),
            document_type: self.document_type,
            document_number: self.document_number.trim().to_string(),
            issue_date,
        };
        Ok((credentials, metadata))
    }

    /// Validate and register. On success the form is reset; the session is
    /// signed in as the new user unless email confirmation is pending.
    pub async fn submit(
        &mut self,
        session: &SessionManager,
        today: Date,
    ) -> AppResult<Registration> {
        let (credentials, metadata) = self.validate(today)?;
        let registration = session.sign_up(&credentials, &metadata).await?;
        self.reset();
        Ok(registration)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> RegistrationForm {
        RegistrationForm {
            full_name: "Ana Pérez".into(),
            document_type: DocumentType::default(),
            document_number: "1020304050".into(),
            issue_date: Some(day(2015, 6, 1)),
            email: "ana@example.com".into(),
            password: "secreto".into(),
        }
    }

    #[test]
    fn valid_form_builds_payload() {
        let (creds, meta) = filled().validate(day(2026, 10, 19)).unwrap();
        assert_eq!(creds.email, "ana@example.com");
        assert_eq!(meta.document_type, DocumentType::CitizenId);
        assert_eq!(meta.issue_date, day(2015, 6, 1));
    }

    #[test]
    fn issue_date_is_checked_first() {
        let form = RegistrationForm {
            issue_date: None,
            full_name: String::new(),
            ..filled()
        };
        let err = form.validate(day(2026, 10, 19)).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("issue date"));
    }

    #[test]
    fn short_password_and_bad_email_are_rejected() {
        let today = day(2026, 10, 19);
        let short = RegistrationForm {
            password: "12345".into(),
            ..filled()
        };
        assert!(short.validate(today).is_err());

        let bad_email = RegistrationForm {
            email: "not-an-email".into(),
            ..filled()
        };
        assert!(bad_email.validate(today).is_err());
    }

    #[test]
    fn future_issue_date_is_rejected() {
        let form = RegistrationForm {
            issue_date: Some(day(2026, 10, 20)),
            ..filled()
        };
        assert!(form.validate(day(2026, 10, 19)).is_err());
    }
}
