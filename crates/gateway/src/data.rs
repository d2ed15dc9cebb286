//! Data contract of the gateway: CRUD on rows plus change subscriptions.

use async_trait::async_trait;

use crate::changes::ChangeFilter;
use crate::channel::Channel;
use crate::error::GatewayResult;
use crate::query::{Query, Row, Update};

/// Identity-scoped row access backed by the remote platform.
///
/// Authorization (row-level security) is the platform's job; callers still
/// pass the identity filter on every request.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Read the rows matching `query`.
    async fn select(&self, query: &Query) -> GatewayResult<Vec<Row>>;

    /// Persist one row in `table`.
    async fn insert(&self, table: &str, row: Row) -> GatewayResult<()>;

    /// Apply a scoped partial update. Returns the number of rows changed.
    async fn update(&self, update: &Update) -> GatewayResult<u64>;

    /// Open a live invalidation channel for rows matching `filter`.
    async fn subscribe(&self, filter: ChangeFilter) -> GatewayResult<Channel>;
}
