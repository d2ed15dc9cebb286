//! Read-only list views over the signed-in user's records.

pub mod appointments;
pub mod documents;
pub mod list;

pub use appointments::AppointmentsView;
pub use documents::DocumentsView;
pub use list::{ListState, ListView};
