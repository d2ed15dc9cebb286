//! Medical document categories as stored in `documentos_medicos.tipo`.

use serde::{Deserialize, Serialize};

pub const CATEGORY_MEDICAL_ORDER: &str = "orden_medica";
pub const CATEGORY_MEDICATION: &str = "medicamento";
pub const CATEGORY_LAB_RESULT: &str = "resultado_laboratorio";
pub const CATEGORY_OTHER: &str = "otro";

/// Category of a provider-issued document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentCategory {
    MedicalOrder,
    Medication,
    LabResult,
    Other,
    /// A value outside the known set; the raw value doubles as its label.
    Unrecognized(String),
}

impl DocumentCategory {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentCategory::MedicalOrder => CATEGORY_MEDICAL_ORDER,
            DocumentCategory::Medication => CATEGORY_MEDICATION,
            DocumentCategory::LabResult => CATEGORY_LAB_RESULT,
            DocumentCategory::Other => CATEGORY_OTHER,
            DocumentCategory::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DocumentCategory::MedicalOrder => "Orden Médica",
            DocumentCategory::Medication => "Medicamento",
            DocumentCategory::LabResult => "Resultado Lab.",
            DocumentCategory::Other => "Otro",
            DocumentCategory::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for DocumentCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            CATEGORY_MEDICAL_ORDER => DocumentCategory::MedicalOrder,
            CATEGORY_MEDICATION => DocumentCategory::Medication,
            CATEGORY_LAB_RESULT => DocumentCategory::LabResult,
            CATEGORY_OTHER => DocumentCategory::Other,
            _ => DocumentCategory::Unrecognized(raw),
        }
    }
}

impl From<DocumentCategory> for String {
    fn from(category: DocumentCategory) -> Self {
        match category {
            DocumentCategory::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_have_labels() {
        let category: DocumentCategory =
            serde_json::from_str("\"resultado_laboratorio\"").unwrap();
        assert_eq!(category, DocumentCategory::LabResult);
        assert_eq!(category.label(), "Resultado Lab.");
    }

    #[test]
    fn unknown_category_labels_with_raw_value() {
        let category = DocumentCategory::from("radiografia".to_string());
        assert_eq!(category.label(), "radiografia");
        assert_eq!(String::from(category), "radiografia");
    }
}
