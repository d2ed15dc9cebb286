//! Input forms. Each validates locally and touches the gateway only once
//! every field passes.

pub mod appointment;
pub mod registration;
pub mod sign_in;

pub use appointment::{AppointmentForm, Confirmation};
pub use registration::RegistrationForm;
pub use sign_in::SignInForm;

use medportal_core::types::Date;

/// Today's date in the local time zone, the reference for date checks.
pub fn today() -> Date {
    chrono::Local::now().date_naive()
}
