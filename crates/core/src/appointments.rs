//! Appointment vocabulary: lifecycle status, specialties, badge styling.
//!
//! Wire values are the strings stored in the `citas` table; they are kept
//! exactly as the gateway schema spells them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Badge variants
// ---------------------------------------------------------------------------

/// Visual emphasis a UI shell should give to a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an appointment.
///
/// Values the portal does not know are preserved in
/// [`AppointmentStatus::Unrecognized`] so a schema addition on the gateway
/// side never breaks the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Unrecognized(String),
}

pub const STATUS_SCHEDULED: &str = "programada";
pub const STATUS_COMPLETED: &str = "completada";
pub const STATUS_CANCELLED: &str = "cancelada";

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => STATUS_SCHEDULED,
            AppointmentStatus::Completed => STATUS_COMPLETED,
            AppointmentStatus::Cancelled => STATUS_CANCELLED,
            AppointmentStatus::Unrecognized(raw) => raw,
        }
    }

    /// Badge styling: scheduled is plain, completed is muted, cancelled is
    /// destructive. Anything unknown falls back to plain.
    pub fn badge_variant(&self) -> BadgeVariant {
        match self {
            AppointmentStatus::Scheduled => BadgeVariant::Default,
            AppointmentStatus::Completed => BadgeVariant::Secondary,
            AppointmentStatus::Cancelled => BadgeVariant::Destructive,
            AppointmentStatus::Unrecognized(_) => BadgeVariant::Default,
        }
    }

    /// Display label: the wire value with its first letter capitalized.
    pub fn label(&self) -> String {
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            STATUS_SCHEDULED => AppointmentStatus::Scheduled,
            STATUS_COMPLETED => AppointmentStatus::Completed,
            STATUS_CANCELLED => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Unrecognized(raw),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Specialty
// ---------------------------------------------------------------------------

/// Medical specialties offered by the appointment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "medicina_general")]
    GeneralMedicine,
    #[serde(rename = "cardiologia")]
    Cardiology,
    #[serde(rename = "dermatologia")]
    Dermatology,
    #[serde(rename = "pediatria")]
    Pediatrics,
    #[serde(rename = "ginecologia")]
    Gynecology,
    #[serde(rename = "odontologia")]
    Dentistry,
    #[serde(rename = "oftalmologia")]
    Ophthalmology,
    #[serde(rename = "traumatologia")]
    Traumatology,
}

impl Specialty {
    /// Every option, in form display order.
    pub const ALL: [Specialty; 8] = [
        Specialty::GeneralMedicine,
        Specialty::Cardiology,
        Specialty::Dermatology,
        Specialty::Pediatrics,
        Specialty::Gynecology,
        Specialty::Dentistry,
        Specialty::Ophthalmology,
        Specialty::Traumatology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralMedicine => "medicina_general",
            Specialty::Cardiology => "cardiologia",
            Specialty::Dermatology => "dermatologia",
            Specialty::Pediatrics => "pediatria",
            Specialty::Gynecology => "ginecologia",
            Specialty::Dentistry => "odontologia",
            Specialty::Ophthalmology => "oftalmologia",
            Specialty::Traumatology => "traumatologia",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Specialty::GeneralMedicine => "Medicina General",
            Specialty::Cardiology => "Cardiología",
            Specialty::Dermatology => "Dermatología",
            Specialty::Pediatrics => "Pediatría",
            Specialty::Gynecology => "Ginecología",
            Specialty::Dentistry => "Odontología",
            Specialty::Ophthalmology => "Oftalmología",
            Specialty::Traumatology => "Traumatología",
        }
    }

    /// Parse a wire value. Returns `None` for anything not in [`Specialty::ALL`].
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}
