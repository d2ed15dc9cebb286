//! Typed row models and identity-scoped repositories over the data gateway.
//!
//! Column names follow the remote schema; the Rust field names are
//! mapped with `serde(rename)`.

pub mod models;
pub mod repositories;
