//! Generated document model for document-service.

use chrono::{DateTime, Utc};
use ordering_service::numbering::SequenceKind;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

/// The closed set of document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Quote,
    Invoice,
    CombinedInvoice,
    WorkOrder,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::Quote,
        TemplateType::Invoice,
        TemplateType::CombinedInvoice,
        TemplateType::WorkOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Quote => "quote",
            TemplateType::Invoice => "invoice",
            TemplateType::CombinedInvoice => "combined_invoice",
            TemplateType::WorkOrder => "work_order",
        }
    }

    /// Parse a template type; anything outside the closed set is a caller
    /// error, rejected before any store call is attempted.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "quote" => Ok(TemplateType::Quote),
            "invoice" => Ok(TemplateType::Invoice),
            "combined_invoice" => Ok(TemplateType::CombinedInvoice),
            "work_order" => Ok(TemplateType::WorkOrder),
            other => Err(AppError::UnknownTemplate(other.to_string())),
        }
    }

    /// The numbering sequence owned by documents of this type.
    pub fn sequence_kind(&self) -> SequenceKind {
        match self {
            TemplateType::Quote => SequenceKind::Quote,
            TemplateType::Invoice => SequenceKind::Invoice,
            TemplateType::CombinedInvoice => SequenceKind::CombinedInvoice,
            TemplateType::WorkOrder => SequenceKind::WorkOrder,
        }
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => DocumentStatus::Sent,
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            "paid" => DocumentStatus::Paid,
            "cancelled" => DocumentStatus::Cancelled,
            _ => DocumentStatus::Draft,
        }
    }
}

/// The persisted record of one generation run.
///
/// `generation_data` holds the full data snapshot used to fill the template,
/// verbatim, so the document can be regenerated later. Regeneration replaces
/// `store_document_id`, `artifact_url` and the snapshot in place; prior
/// artifacts are not retained.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedDocument {
    pub document_id: Uuid,
    pub organization_id: Uuid,
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub template_type: String,
    pub document_number: String,
    pub file_name: String,
    pub store_document_id: String,
    pub artifact_url: String,
    pub status: String,
    pub generation_data: serde_json::Value,
    pub sent_at: Option<DateTime<Utc>>,
    pub sent_to: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording a generation run.
#[derive(Debug, Clone)]
pub struct CreateGeneratedDocument {
    pub organization_id: Uuid,
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub template_type: TemplateType,
    pub document_number: String,
    pub file_name: String,
    pub store_document_id: String,
    pub artifact_url: String,
    pub generation_data: serde_json::Value,
    pub created_by: Option<Uuid>,
}

/// Filter parameters for listing generated documents.
#[derive(Debug, Clone, Default)]
pub struct ListDocumentsFilter {
    pub template_type: Option<TemplateType>,
    pub order_id: Option<Uuid>,
    pub status: Option<DocumentStatus>,
    pub page_size: i32,
    pub page_token: Option<Uuid>,
}

/// Output of one generation run, returned by the generator before the
/// caller persists the owning [`GeneratedDocument`].
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub store_document_id: String,
    pub artifact_url: String,
    pub template_type: TemplateType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_closed_set() {
        for t in TemplateType::ALL {
            assert_eq!(TemplateType::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn parse_rejects_unknown_types() {
        let err = TemplateType::parse("reminder").unwrap_err();
        assert!(matches!(
            err,
            service_core::error::AppError::UnknownTemplate(ref t) if t == "reminder"
        ));
    }

    #[test]
    fn sequence_kinds_match_the_prefix_table() {
        assert_eq!(TemplateType::Quote.sequence_kind().prefix(), "OFF");
        assert_eq!(TemplateType::Invoice.sequence_kind().prefix(), "FACT");
        assert_eq!(TemplateType::CombinedInvoice.sequence_kind().prefix(), "FACT");
        assert_eq!(TemplateType::WorkOrder.sequence_kind().prefix(), "WB");
    }
}
