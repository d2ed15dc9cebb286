//! Repository for the `notificaciones` table.

use medportal_core::types::{RecordId, UserId};
use medportal_gateway::{
    ChangeFilter, Channel, DataGateway, Direction, EventClass, GatewayResult, Query, Update,
};

use crate::models::notification::{NewNotification, Notification};
use crate::repositories::{decode_rows, encode_row, COL_USER_ID};

/// Remote table name.
pub const TABLE: &str = "notificaciones";

/// Provides reads, inserts and the read-flag transition for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for a user.
    pub async fn create(gateway: &dyn DataGateway, input: &NewNotification) -> GatewayResult<()> {
        gateway.insert(TABLE, encode_row(input)?).await
    }

    /// The `limit` most recent notifications for a user, newest first.
    pub async fn list_recent(
        gateway: &dyn DataGateway,
        user_id: UserId,
        limit: usize,
    ) -> GatewayResult<Vec<Notification>> {
        let query = Query::from(TABLE)
            .eq(COL_USER_ID, user_id.to_string())
            .order("created_at", Direction::Descending)
            .limit(limit);
        decode_rows(gateway.select(&query).await?)
    }

    /// Mark a single notification as read.
    ///
    /// The update is scoped by both id and owner, so another user's
    /// notification is never touched. Returns `true` if a row was updated.
    pub async fn mark_read(
        gateway: &dyn DataGateway,
        notification_id: RecordId,
        user_id: UserId,
    ) -> GatewayResult<bool> {
        let update = Update::new(TABLE, notification_id, COL_USER_ID, user_id.to_string())
            .set("leida", true);
        Ok(gateway.update(&update).await? > 0)
    }

    /// Open a live channel signalling any insert, update or delete of the
    /// user's notifications.
    pub async fn watch(gateway: &dyn DataGateway, user_id: UserId) -> GatewayResult<Channel> {
        let filter = ChangeFilter::table(TABLE)
            .events(EventClass::Any)
            .eq(COL_USER_ID, user_id.to_string());
        gateway.subscribe(filter).await
    }
}
