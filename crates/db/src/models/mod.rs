pub mod appointment;
pub mod document;
pub mod notification;

pub use appointment::{Appointment, NewAppointment};
pub use document::MedicalDocument;
pub use notification::{NewNotification, Notification};
