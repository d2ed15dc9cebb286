use medportal_core::documents::DocumentCategory;
use medportal_core::types::{Date, RecordId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A row from the `documentos_medicos` table. Read-only for the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalDocument {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(rename = "tipo")]
    pub category: DocumentCategory,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "fecha_documento")]
    pub document_date: Date,
    pub created_at: Timestamp,
}

impl MedicalDocument {
    /// Description for display, with a placeholder when absent.
    pub fn description_or_placeholder(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "Sin descripción",
        }
    }
}
