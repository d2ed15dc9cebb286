//! Appointment row model and insert DTO.

use medportal_core::appointments::{AppointmentStatus, Specialty};
use medportal_core::types::{Date, RecordId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A row from the `citas` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(rename = "fecha")]
    pub date: Date,
    #[serde(rename = "hora")]
    pub time: String,
    /// Raw specialty wire value; see [`Appointment::specialty_label`].
    #[serde(rename = "especialidad")]
    pub specialty: String,
    #[serde(rename = "medico")]
    pub provider: String,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Appointment {
    /// Human label for the specialty, or the raw value if it is not one of
    /// the form's options.
    pub fn specialty_label(&self) -> &str {
        Specialty::parse(&self.specialty)
            .map(|s| s.label())
            .unwrap_or(self.specialty.as_str())
    }

    /// Notes worth showing: present and not blank.
    pub fn visible_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }
}

/// DTO for creating an appointment.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub user_id: UserId,
    #[serde(rename = "fecha")]
    pub date: Date,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
    #[serde(rename = "medico")]
    pub provider: String,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
}
