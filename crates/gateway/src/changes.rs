//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] fans out every row-level [`ChangeEvent`] an in-process
//! gateway applies. Subscriptions narrow the stream with a
//! [`ChangeFilter`] and forward matches into a [`Channel`](crate::Channel).

use medportal_core::types::Timestamp;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::query::Row;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change applied by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    /// The row after the change (before it, for deletes).
    pub row: Row,
    pub timestamp: Timestamp,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind, row: Row) -> Self {
        Self {
            table: table.into(),
            kind,
            row,
            timestamp: chrono::Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeFilter
// ---------------------------------------------------------------------------

/// Which event classes a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventClass {
    #[default]
    Any,
    Insert,
    Update,
    Delete,
}

impl EventClass {
    pub fn admits(&self, kind: ChangeKind) -> bool {
        matches!(
            (self, kind),
            (EventClass::Any, _)
                | (EventClass::Insert, ChangeKind::Insert)
                | (EventClass::Update, ChangeKind::Update)
                | (EventClass::Delete, ChangeKind::Delete)
        )
    }
}

/// Subscription predicate: table, event class and an optional
/// `column = value` row filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeFilter {
    pub table: String,
    pub events: EventClass,
    pub predicate: Option<(String, Value)>,
}

impl ChangeFilter {
    /// Listen to every change on `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            events: EventClass::Any,
            predicate: None,
        }
    }

    pub fn events(mut self, events: EventClass) -> Self {
        self.events = events;
        self
    }

    /// Only rows where `column = value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicate = Some((column.into(), value.into()));
        self
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.table != self.table || !self.events.admits(event.kind) {
            return false;
        }
        match &self.predicate {
            Some((column, value)) => event.row.get(column) == Some(value),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of [`ChangeEvent`]s.
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` when the buffer wraps.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
