//! Pre-generation data validation.
//!
//! Validation never raises: the outcome is a structured report the caller
//! acts on. Warnings never block generation; `is_valid` is false only when
//! the error list is non-empty. Callable standalone for previews, with no
//! side effects and no artifact produced.

use crate::dtos::DocumentData;
use crate::models::TemplateType;
use rust_decimal::Decimal;
use serde::Serialize;

/// Structured validation outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

/// Validate a payload for generation against a template type.
pub fn validate_data(template_type: TemplateType, data: &DocumentData) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Required fields
    if data.customer.company_name.trim().is_empty() {
        errors.push("Missing required field: customer.company_name".to_string());
    }
    if data.document_number.trim().is_empty() {
        errors.push("Missing required field: document_number".to_string());
    }
    if data.date.trim().is_empty() {
        errors.push("Missing required field: date".to_string());
    }

    // Items: an empty document is permitted but flagged
    if data.items.is_empty() {
        warnings.push("No items provided - document will be empty".to_string());
    } else {
        for (i, item) in data.items.iter().enumerate() {
            if item.description.trim().is_empty() {
                errors.push(format!("Item {}: Missing description", i + 1));
            }
            if item.quantity.is_none() {
                warnings.push(format!("Item {}: Missing quantity", i + 1));
            }
        }
    }

    if template_type == TemplateType::Invoice && data.totals.total_incl_tax == Decimal::ZERO {
        warnings.push("No total amount specified for invoice".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
