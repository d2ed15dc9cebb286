//! Appointment booking form.

use medportal_core::appointments::{AppointmentStatus, Specialty};
use medportal_core::error::CoreError;
use medportal_core::types::{Date, Identity};
use medportal_core::validation::{validate_appointment_date, validate_required, validate_selected};
use medportal_db::models::{NewAppointment, NewNotification};
use medportal_db::repositories::{AppointmentRepo, NotificationRepo};
use medportal_gateway::DataGateway;

use crate::error::{AppError, AppResult};

/// Notification kind attached to booking confirmations.
pub const NOTIFICATION_KIND: &str = "cita";

/// Title of the notification written after a booking.
pub const NOTIFICATION_TITLE: &str = "Appointment registered";

/// Toast content shown after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub date: Option<Date>,
    /// Time of day as entered, e.g. `"09:30"`.
    pub time: String,
    pub specialty: Option<Specialty>,
    pub provider: String,
    pub reason: String,
    /// Optional free text.
    pub notes: String,
}

impl AppointmentForm {
    /// Check every field and build the row to insert.
    ///
    /// The date is checked first, then the remaining required fields in
    /// form order.
    pub fn validate(&self, identity: &Identity, today: Date) -> Result<NewAppointment, CoreError> {
        let date = *validate_selected(&self.date, "Please select a date")?;
        validate_appointment_date(date, today)?;
        validate_required("Time", &self.time)?;
        let specialty = *validate_selected(&self.specialty, "Please select a specialty")?;
        validate_required("Provider", &self.provider)?;
        validate_required("Reason", &self.reason)?;

        let notes = self.notes.trim();
        Ok(NewAppointment {
            user_id: identity.user_id,
            date,
            time: self.time.trim().to_string(),
            specialty,
            provider: self.provider.trim().to_string(),
            reason: self.reason.trim().to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            status: AppointmentStatus::Scheduled,
        })
    }

    /// Validate, book the appointment, then post a confirmation
    /// notification.
    ///
    /// Nothing is sent unless validation passes. A failed booking is
    /// returned and the fields are kept. A failed confirmation notification
    /// is only logged. On success the form is reset.
    pub async fn submit(
        &mut self,
        gateway: &dyn DataGateway,
        identity: Option<&Identity>,
        today: Date,
    ) -> AppResult<Confirmation> {
        let identity = identity.ok_or(AppError::NotSignedIn)?;
        let appointment = self.validate(identity, today)?;

        AppointmentRepo::create(gateway, &appointment)
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = %identity.user_id,
                    error = %e,
                    "Failed to book appointment"
                );
                e
            })?;
        tracing::info!(
            user_id = %identity.user_id,
            date = %appointment.date,
            specialty = appointment.specialty.as_str(),
            "Appointment booked"
        );

        let notification = confirmation_notification(&appointment);
        if let Err(e) = NotificationRepo::create(gateway, &notification).await {
            tracing::warn!(
                user_id = %identity.user_id,
                error = %e,
                "Failed to post booking notification"
            );
        }

        self.reset();
        Ok(Confirmation {
            title: "Appointment registered!".to_string(),
            message: "Your appointment has been scheduled.".to_string(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn confirmation_notification(appointment: &NewAppointment) -> NewNotification {
    let message = format!(
        "Your {} appointment on {} has been registered.",
        appointment.specialty.label(),
        appointment.date.format("%B %-d, %Y"),
    );
    NewNotification::new(appointment.user_id, NOTIFICATION_TITLE, message)
        .with_kind(NOTIFICATION_KIND)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use medportal_core::types::UserId;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> AppointmentForm {
        AppointmentForm {
            date: Some(day(2026, 11, 3)),
            time: "10:00".into(),
            specialty: Some(Specialty::Dermatology),
            provider: "Dra. Gómez".into(),
            reason: "Revisión".into(),
            notes: "  ".into(),
        }
    }

    #[test]
    fn missing_date_is_reported_before_other_fields() {
        let me = Identity::new(UserId::new_v4(), "a@b.co");
        let form = AppointmentForm::default();
        let err = form.validate(&me, day(2026, 10, 19)).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == "Please select a date");
    }

    #[test]
    fn past_date_is_rejected() {
        let me = Identity::new(UserId::new_v4(), "a@b.co");
        let form = AppointmentForm {
            date: Some(day(2026, 10, 18)),
            ..filled()
        };
        assert!(form.validate(&me, day(2026, 10, 19)).is_err());
    }

    #[test]
    fn blank_notes_become_none() {
        let me = Identity::new(UserId::new_v4(), "a@b.co");
        let row = filled().validate(&me, day(2026, 10, 19)).unwrap();
        assert_eq!(row.notes, None);
        assert_eq!(row.status, AppointmentStatus::Scheduled);
        assert_eq!(row.user_id, me.user_id);
    }

    #[test]
    fn confirmation_names_specialty_and_date() {
        let me = Identity::new(UserId::new_v4(), "a@b.co");
        let row = filled().validate(&me, day(2026, 10, 19)).unwrap();
        let n = confirmation_notification(&row);
        assert_eq!(n.title, NOTIFICATION_TITLE);
        assert_eq!(n.kind.as_deref(), Some("cita"));
        assert_eq!(
            n.message,
            "Your Dermatología appointment on November 3, 2026 has been registered."
        );
    }
}
