//! Domain vocabulary for the patient portal.
//!
//! This crate has no internal dependencies: ids, timestamps, error type,
//! wire-value enums and local form validators live here so both the
//! repository layer and the view layer can share them.

pub mod appointments;
pub mod documents;
pub mod error;
pub mod profile;
pub mod types;
pub mod validation;
