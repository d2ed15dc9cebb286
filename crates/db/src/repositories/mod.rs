pub mod appointment_repo;
pub mod document_repo;
pub mod notification_repo;

pub use appointment_repo::AppointmentRepo;
pub use document_repo::DocumentRepo;
pub use notification_repo::NotificationRepo;

use medportal_gateway::{GatewayResult, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Owner column present on every portal table.
pub const COL_USER_ID: &str = "user_id";

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> GatewayResult<Vec<T>> {
    let decoded = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(decoded)
}

fn encode_row<T: Serialize>(input: &T) -> GatewayResult<Row> {
    Ok(serde_json::to_value(input)?)
}
