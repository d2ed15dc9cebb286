//! Patient profile metadata attached to the session at sign-up.

use serde::{Deserialize, Serialize};

use crate::types::Date;

/// Kind of identity document a patient registers with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// Cédula de Ciudadanía.
    #[default]
    #[serde(rename = "CC")]
    CitizenId,
    /// Tarjeta de Identidad.
    #[serde(rename = "TI")]
    IdentityCard,
    /// Cédula de Extranjería.
    #[serde(rename = "CE")]
    ForeignerId,
    #[serde(rename = "Pasaporte")]
    Passport,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::CitizenId,
        DocumentType::IdentityCard,
        DocumentType::ForeignerId,
        DocumentType::Passport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::CitizenId => "Cédula de Ciudadanía",
            DocumentType::IdentityCard => "Tarjeta de Identidad",
            DocumentType::ForeignerId => "Cédula de Extranjería",
            DocumentType::Passport => "Pasaporte",
        }
    }
}

/// Profile fields merged into the gateway's user metadata at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "tipo_documento")]
    pub document_type: DocumentType,
    #[serde(rename = "numero_documento")]
    pub document_number: String,
    #[serde(rename = "fecha_expedicion")]
    pub issue_date: Date,
}
