//! Contracts and adapters for the portal's backend-as-a-service.
//!
//! The remote platform owns storage, authentication, row-level security
//! and change notification. This crate describes what the portal needs
//! from it and ships two adapters:
//!
//! - [`DataGateway`] / [`AuthGateway`]: the contracts.
//! - [`Query`] / [`Update`]: request builders; updates are always
//!   identity-scoped.
//! - [`Channel`]: a closeable live invalidation feed.
//! - [`MemoryGateway`]: in-process adapter with a [`ChangeBus`].
//! - [`RestGateway`]: HTTP adapter for PostgREST/GoTrue style backends.

pub mod auth;
pub mod changes;
pub mod channel;
pub mod data;
pub mod error;
pub mod memory;
pub mod query;
pub mod rest;

pub use auth::{AuthGateway, Credentials, Session, SignUpOutcome};
pub use changes::{ChangeBus, ChangeEvent, ChangeFilter, ChangeKind, EventClass};
pub use channel::{Channel, ChannelFeed};
pub use data::DataGateway;
pub use error::{GatewayError, GatewayResult};
pub use memory::MemoryGateway;
pub use query::{Direction, Query, Row, Update};
pub use rest::RestGateway;
