//! The document generation engine.
//!
//! One generation request runs the pipeline copy, substitute, export
//! against the configured [`DocumentStore`]. Each step is a failure point
//! that aborts the whole run; no partial artifact is ever returned as a
//! valid output, and no retry happens here. Validation is decoupled from
//! generation so previews stay cheap: [`generate`](DocumentGenerator::generate)
//! assumes the payload already passed [`validate_data`].

pub mod placeholders;
mod validate;

pub use validate::{validate_data, ValidationReport};

use crate::dtos::{DocumentData, DocumentRequest, OrderMeta, OrganizationData, TotalsData};
use crate::models::{GenerationResult, TemplateType};
use crate::services::docstore::DocumentStore;
use crate::services::metrics::{GENERATIONS_TOTAL, GENERATION_DURATION};
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Maps each template type to the id of its template document in the
/// backing store.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    ids: HashMap<TemplateType, String>,
}

impl TemplateRegistry {
    pub fn new(ids: HashMap<TemplateType, String>) -> Self {
        Self { ids }
    }

    pub fn with_template(mut self, template_type: TemplateType, id: impl Into<String>) -> Self {
        self.ids.insert(template_type, id.into());
        self
    }

    pub fn template_id(&self, template_type: TemplateType) -> Option<&str> {
        self.ids.get(&template_type).map(String::as_str)
    }
}

impl Default for TemplateRegistry {
    /// Template ids default to `<type>.txt`, the file naming used by the
    /// local store's template directory.
    fn default() -> Self {
        let ids = TemplateType::ALL
            .into_iter()
            .map(|t| (t, format!("{}.txt", t.as_str())))
            .collect();
        Self { ids }
    }
}

/// Generation tuning.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Ceiling on repeating item slots; items beyond it are dropped.
    pub max_item_slots: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self { max_item_slots: 10 }
    }
}

/// Normalize caller-supplied order data and organization data into the flat
/// document shape. The totals are always recomputed from the supplied items
/// so the figures on the document agree with its own line items even when
/// the caller's order-level totals are stale.
pub fn prepare_document_data(
    request: &DocumentRequest,
    organization: &OrganizationData,
) -> DocumentData {
    let date = if request.date.trim().is_empty() {
        Utc::now().format("%d-%m-%Y").to_string()
    } else {
        request.date.clone()
    };

    DocumentData {
        customer: request.customer.clone(),
        order: OrderMeta {
            order_number: request.order_number.clone(),
            order_date: request.order_date.clone(),
            status: request.status.clone(),
        },
        document_number: request.document_number.clone(),
        date,
        description: request.description.clone(),
        notes: request.notes.clone(),
        totals: TotalsData::from_items(&request.items),
        items: request.items.clone(),
        organization: organization.clone(),
    }
}

/// Strip characters that do not belong in a file name and cap the length.
fn sanitize_name_fragment(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .take(20)
        .collect()
}

/// Derive a unique, traceable artifact name: document number (or a generic
/// fallback), a sanitized customer fragment, and a generation timestamp so
/// repeated runs over identical business data never collide.
fn document_name(data: &DocumentData) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");

    let customer = sanitize_name_fragment(&data.customer.company_name);
    let customer = if customer.is_empty() {
        "Unknown".to_string()
    } else {
        customer
    };

    if data.document_number.is_empty() {
        format!("Document_{}_{}", customer, timestamp)
    } else {
        format!("{}_{}_{}", data.document_number, customer, timestamp)
    }
}

fn generation_failed(step: &'static str, cause: AppError) -> AppError {
    AppError::GenerationFailed(anyhow::Error::new(cause).context(step))
}

/// A template's identity and declared contract.
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub template_type: TemplateType,
    pub modified_utc: Option<DateTime<Utc>>,
    pub placeholders: Vec<String>,
}

/// Fills templates and exports artifacts through a [`DocumentStore`].
pub struct DocumentGenerator {
    store: Arc<dyn DocumentStore>,
    templates: TemplateRegistry,
    settings: GeneratorSettings,
}

impl DocumentGenerator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        templates: TemplateRegistry,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            store,
            templates,
            settings,
        }
    }

    /// The full declared token set of a template type: common fields, the
    /// repeating block expanded across the slot ceiling, financial totals,
    /// and the per-type extras. Deduplicated and sorted.
    pub fn template_placeholders(&self, template_type: TemplateType) -> Vec<String> {
        placeholders::all_placeholders(template_type, self.settings.max_item_slots)
    }

    /// Template metadata from the store plus the declared placeholder set,
    /// self-documenting the template's contract.
    pub async fn template_info(&self, template_type: TemplateType) -> Result<TemplateInfo, AppError> {
        let template_id = self
            .templates
            .template_id(template_type)
            .ok_or_else(|| AppError::UnknownTemplate(template_type.as_str().to_string()))?;

        let metadata = self.store.get_metadata(template_id).await?;

        Ok(TemplateInfo {
            id: metadata.id,
            name: metadata.name,
            template_type,
            modified_utc: metadata.modified_utc,
            placeholders: self.template_placeholders(template_type),
        })
    }

    /// Run the generation pipeline. The payload is assumed to have passed
    /// [`validate_data`]; the template type is checked against the registry
    /// before any store call.
    ///
    /// A working document created by a step that later fails is not cleaned
    /// up; it remains as an orphaned store resource.
    #[instrument(skip(self, data), fields(template_type = %template_type, document_number = %data.document_number))]
    pub async fn generate(
        &self,
        template_type: TemplateType,
        data: &DocumentData,
    ) -> Result<GenerationResult, AppError> {
        let template_id = self
            .templates
            .template_id(template_type)
            .ok_or_else(|| AppError::UnknownTemplate(template_type.as_str().to_string()))?;

        let timer = GENERATION_DURATION
            .with_label_values(&[template_type.as_str()])
            .start_timer();

        let result = self.run_pipeline(template_type, template_id, data).await;

        timer.observe_duration();
        let status = if result.is_ok() { "ok" } else { "failed" };
        GENERATIONS_TOTAL
            .with_label_values(&[template_type.as_str(), status])
            .inc();

        result
    }

    async fn run_pipeline(
        &self,
        template_type: TemplateType,
        template_id: &str,
        data: &DocumentData,
    ) -> Result<GenerationResult, AppError> {
        let doc_name = document_name(data);

        // Step 1: copy the template
        let store_document_id = self
            .store
            .duplicate(template_id, &doc_name)
            .await
            .map_err(|e| generation_failed("Failed to copy template", e))?;

        // Step 2 + 3: substitute common fields and the repeating item block
        // in one batch
        let mut replacements = placeholders::basic_replacements(data);
        replacements.extend(placeholders::extra_replacements(template_type, data));
        replacements.extend(placeholders::item_replacements(
            &data.items,
            self.settings.max_item_slots,
        ));

        let replaced = self
            .store
            .replace_all(&store_document_id, &replacements)
            .await
            .map_err(|e| generation_failed("Failed to replace placeholders", e))?;

        // Step 4: export
        let artifact = self
            .store
            .export(&store_document_id, &format!("{}.pdf", doc_name))
            .await
            .map_err(|e| generation_failed("Failed to export document", e))?;

        info!(
            store_document_id = %store_document_id,
            artifact_url = %artifact.url,
            replacements = replaced,
            "Document generated"
        );

        Ok(GenerationResult {
            store_document_id,
            artifact_url: artifact.url,
            template_type,
            created_at: Utc::now(),
        })
    }

    /// Re-run generation from a persisted snapshot, optionally overlaid
    /// with caller-supplied overrides (shallow, top-level keys). Returns
    /// the merged data alongside the new result so the caller can persist
    /// the updated snapshot; the previous artifact reference is replaced,
    /// not appended.
    #[instrument(skip(self, snapshot, overrides), fields(template_type = %template_type))]
    pub async fn regenerate(
        &self,
        template_type: TemplateType,
        snapshot: &serde_json::Value,
        overrides: Option<&serde_json::Value>,
    ) -> Result<(DocumentData, GenerationResult), AppError> {
        let merged = overlay(snapshot, overrides);
        let data: DocumentData = serde_json::from_value(merged).map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Invalid generation snapshot: {}", e))
        })?;

        let result = self.generate(template_type, &data).await?;
        Ok((data, result))
    }
}

/// Shallow merge: top-level keys of `overrides` replace those of `base`.
fn overlay(base: &serde_json::Value, overrides: Option<&serde_json::Value>) -> serde_json::Value {
    let mut merged = base.clone();
    if let (Some(target), Some(serde_json::Value::Object(extra))) =
        (merged.as_object_mut(), overrides)
    {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::ItemData;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn prepared_totals_ignore_stale_caller_totals() {
        let request = DocumentRequest {
            items: vec![
                ItemData {
                    description: "Installatie".to_string(),
                    quantity: Some(dec!(2)),
                    total_excl_tax: dec!(200.00),
                    total_incl_tax: dec!(242.00),
                    ..Default::default()
                },
                ItemData {
                    description: "Materiaal".to_string(),
                    quantity: Some(dec!(1)),
                    total_excl_tax: dec!(50.00),
                    total_incl_tax: dec!(54.50),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let data = prepare_document_data(&request, &OrganizationData::default());
        assert_eq!(data.totals.subtotal_excl_tax, dec!(250.00));
        assert_eq!(data.totals.tax_total, dec!(46.50));
        assert_eq!(data.totals.total_incl_tax, dec!(296.50));
    }

    #[test]
    fn prepared_date_defaults_to_today() {
        let data = prepare_document_data(&DocumentRequest::default(), &OrganizationData::default());
        assert_eq!(data.date, Utc::now().format("%d-%m-%Y").to_string());
    }

    #[test]
    fn document_name_prefers_the_document_number() {
        let data = DocumentData {
            document_number: "OFF-2025-0001".to_string(),
            customer: crate::dtos::CustomerData {
                company_name: "Bakkerij \"De Haan\" B.V.".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let name = document_name(&data);
        assert!(name.starts_with("OFF-2025-0001_Bakkerij De Haan BV_"));
    }

    #[test]
    fn document_name_falls_back_without_a_number() {
        let name = document_name(&DocumentData::default());
        assert!(name.starts_with("Document_Unknown_"));
    }

    #[test]
    fn overlay_replaces_top_level_keys_only() {
        let base = json!({"notes": "old", "customer": {"company_name": "Acme"}});
        let merged = overlay(&base, Some(&json!({"notes": "new"})));
        assert_eq!(merged["notes"], "new");
        assert_eq!(merged["customer"]["company_name"], "Acme");
    }

    #[test]
    fn overlay_without_overrides_is_identity() {
        let base = json!({"notes": "old"});
        assert_eq!(overlay(&base, None), base);
    }
}
