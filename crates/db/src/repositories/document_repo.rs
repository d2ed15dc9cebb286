//! Repository for the `documentos_medicos` table.

use medportal_core::types::UserId;
use medportal_gateway::{DataGateway, Direction, GatewayResult, Query};

use crate::models::document::MedicalDocument;
use crate::repositories::{decode_rows, COL_USER_ID};

pub const TABLE: &str = "documentos_medicos";

/// Read-only access to provider-issued documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// All of a user's documents, most recent document date first.
    pub async fn list_for_user(
        gateway: &dyn DataGateway,
        user_id: UserId,
    ) -> GatewayResult<Vec<MedicalDocument>> {
        let query = Query::from(TABLE)
            .eq(COL_USER_ID, user_id.to_string())
            .order("fecha_documento", Direction::Descending);
        decode_rows(gateway.select(&query).await?)
    }
}
