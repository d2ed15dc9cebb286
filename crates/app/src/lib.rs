//! Client core of the patient portal.
//!
//! Hosts build a [`state::PortalState`] from [`config::PortalConfig`], then
//! drive the session, the notification panel, the list views and the forms
//! from their own UI shell.

pub mod config;
pub mod error;
pub mod forms;
pub mod notifications;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod views;
