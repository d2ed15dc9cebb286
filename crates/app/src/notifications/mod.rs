//! The notification panel: a bounded, live view over the signed-in user's
//! most recent notifications.
//!
//! [`NotificationPanel`] owns the cache, the unread count and the live
//! channel. [`PanelSnapshot`] is what a shell renders.

pub mod panel;

pub use panel::{NotificationPanel, PanelSnapshot, SessionFollower};
