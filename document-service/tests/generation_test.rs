//! Document generation pipeline tests against the in-memory store.

mod common;

use common::{generator_with_full_templates, sample_organization, sample_request};
use document_service::dtos::ItemData;
use document_service::generator::{
    prepare_document_data, DocumentGenerator, GeneratorSettings, TemplateRegistry,
};
use document_service::models::TemplateType;
use document_service::services::InMemoryDocStore;
use serde_json::json;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

fn assert_no_unresolved_tokens(body: &str) {
    assert!(
        !body.contains('[') && !body.contains(']'),
        "unresolved placeholder tokens remain: {}",
        body
    );
}

#[tokio::test]
async fn generate_resolves_every_placeholder() {
    let (store, generator) = generator_with_full_templates().await;
    let data = prepare_document_data(&sample_request("OFF-2025-0001"), &sample_organization());

    let result = generator
        .generate(TemplateType::Quote, &data)
        .await
        .expect("Failed to generate document");

    let body = store
        .document_body(&result.store_document_id)
        .await
        .expect("Missing generated document");
    assert_no_unresolved_tokens(&body);
    assert!(body.contains("Jansen Installatietechniek"));
    assert!(body.contains("OFF-2025-0001"));
}

#[tokio::test]
async fn generate_formats_totals_as_currency() {
    let (store, generator) = generator_with_full_templates().await;
    let data = prepare_document_data(&sample_request("FACT-2025-0001"), &sample_organization());

    let result = generator
        .generate(TemplateType::Invoice, &data)
        .await
        .expect("Failed to generate document");

    let body = store.document_body(&result.store_document_id).await.unwrap();
    // 200.00 + 50.00 excl, 242.00 + 54.50 incl
    assert!(body.contains("€ 250,00"));
    assert!(body.contains("€ 46,50"));
    assert!(body.contains("€ 296,50"));
    // Item slot 1: 2 x 100.00 at 21%
    assert!(body.contains("€ 100,00"));
    assert!(body.contains("21%"));
}

#[tokio::test]
async fn generate_drops_items_past_the_ceiling_and_still_resolves_all_tokens() {
    let (store, generator) = generator_with_full_templates().await;

    let mut request = sample_request("WB-2025-0001");
    request.items = (1..=14)
        .map(|i| ItemData {
            description: format!("Taak {}", i),
            ..Default::default()
        })
        .collect();
    let data = prepare_document_data(&request, &sample_organization());

    let result = generator
        .generate(TemplateType::WorkOrder, &data)
        .await
        .expect("Failed to generate document");

    let body = store.document_body(&result.store_document_id).await.unwrap();
    assert_no_unresolved_tokens(&body);
    assert!(body.contains("Taak 10"));
    assert!(!body.contains("Taak 11"));
}

#[tokio::test]
async fn generate_blanks_unused_item_slots() {
    let (store, generator) = generator_with_full_templates().await;

    let mut request = sample_request("FACT-2025-0002");
    request.items.truncate(1);
    let data = prepare_document_data(&request, &sample_organization());

    let result = generator
        .generate(TemplateType::Invoice, &data)
        .await
        .expect("Failed to generate document");

    let body = store.document_body(&result.store_document_id).await.unwrap();
    assert_no_unresolved_tokens(&body);
}

#[tokio::test]
async fn generate_exports_an_artifact_reference() {
    let (store, generator) = generator_with_full_templates().await;
    let data = prepare_document_data(&sample_request("OFF-2025-0002"), &sample_organization());

    let result = generator
        .generate(TemplateType::Quote, &data)
        .await
        .expect("Failed to generate document");

    assert!(result.artifact_url.starts_with("memory://exports/OFF-2025-0002_"));
    assert!(result.artifact_url.ends_with(".pdf"));
    assert_eq!(result.template_type, TemplateType::Quote);

    let file_name = result
        .artifact_url
        .strip_prefix("memory://exports/")
        .unwrap();
    let exported = store.exported_body(file_name).await.expect("Missing export");
    assert_no_unresolved_tokens(&exported);
}

#[tokio::test]
async fn generate_rejects_an_unregistered_template_before_any_store_call() {
    let store = Arc::new(InMemoryDocStore::new());
    let generator = DocumentGenerator::new(
        store,
        TemplateRegistry::new(HashMap::new()),
        GeneratorSettings::default(),
    );
    let data = prepare_document_data(&sample_request("OFF-2025-0003"), &sample_organization());

    let err = generator
        .generate(TemplateType::Quote, &data)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownTemplate(_)));
}

#[tokio::test]
async fn generate_wraps_store_failures_as_generation_failed() {
    // Registry knows the template but the store has no such document.
    let store = Arc::new(InMemoryDocStore::new());
    let generator = DocumentGenerator::new(
        store,
        TemplateRegistry::default(),
        GeneratorSettings::default(),
    );
    let data = prepare_document_data(&sample_request("OFF-2025-0004"), &sample_organization());

    let err = generator
        .generate(TemplateType::Quote, &data)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::GenerationFailed(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn regenerate_reuses_the_snapshot_with_overrides() {
    let (store, generator) = generator_with_full_templates().await;
    let data = prepare_document_data(&sample_request("FACT-2025-0003"), &sample_organization());

    let first = generator
        .generate(TemplateType::Invoice, &data)
        .await
        .expect("Failed to generate document");

    let snapshot = serde_json::to_value(&data).unwrap();
    let overrides = json!({"notes": "Herziene levertermijn"});

    let (merged, second) = generator
        .regenerate(TemplateType::Invoice, &snapshot, Some(&overrides))
        .await
        .expect("Failed to regenerate document");

    assert_eq!(merged.notes, "Herziene levertermijn");
    assert_eq!(merged.document_number, data.document_number);
    assert_ne!(first.store_document_id, second.store_document_id);

    let body = store.document_body(&second.store_document_id).await.unwrap();
    assert!(body.contains("Herziene levertermijn"));
    assert_no_unresolved_tokens(&body);
}

#[tokio::test]
async fn template_info_reports_metadata_and_contract() {
    let (_store, generator) = generator_with_full_templates().await;

    let info = generator
        .template_info(TemplateType::WorkOrder)
        .await
        .expect("Failed to get template info");

    assert_eq!(info.id, "work_order.txt");
    assert_eq!(info.template_type, TemplateType::WorkOrder);
    assert!(info.modified_utc.is_some());
    assert_eq!(
        info.placeholders,
        generator.template_placeholders(TemplateType::WorkOrder)
    );
}

#[tokio::test]
async fn placeholders_are_a_superset_of_substituted_tokens() {
    let (_store, generator) = generator_with_full_templates().await;
    let data = prepare_document_data(&sample_request("WB-2025-0002"), &sample_organization());

    for template_type in TemplateType::ALL {
        let declared = generator.template_placeholders(template_type);

        let mut substituted = document_service::generator::placeholders::basic_replacements(&data);
        substituted.extend(document_service::generator::placeholders::extra_replacements(
            template_type,
            &data,
        ));
        substituted.extend(document_service::generator::placeholders::item_replacements(
            &data.items,
            10,
        ));

        for replacement in substituted {
            assert!(
                declared.contains(&replacement.token),
                "{} substitutes undeclared token {}",
                template_type,
                replacement.token
            );
        }
    }
}
