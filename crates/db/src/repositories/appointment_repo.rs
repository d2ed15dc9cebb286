//! Repository for the `citas` table.

use medportal_core::types::UserId;
use medportal_gateway::{DataGateway, Direction, GatewayResult, Query};

use crate::models::appointment::{Appointment, NewAppointment};
use crate::repositories::{decode_rows, encode_row, COL_USER_ID};

pub const TABLE: &str = "citas";

pub struct AppointmentRepo;

impl AppointmentRepo {
    pub async fn create(gateway: &dyn DataGateway, input: &NewAppointment) -> GatewayResult<()> {
        gateway.insert(TABLE, encode_row(input)?).await
    }

    /// All of a user's appointments, soonest date first.
    pub async fn list_for_user(
        gateway: &dyn DataGateway,
        user_id: UserId,
    ) -> GatewayResult<Vec<Appointment>> {
        let query = Query::from(TABLE)
            .eq(COL_USER_ID, user_id.to_string())
            .order("fecha", Direction::Ascending);
        decode_rows(gateway.select(&query).await?)
    }
}
