//! Order -> document generation workflow tests.
//!
//! Exercises the full path: assemble an order with computed totals,
//! allocate sequence numbers, normalize the payload, validate, and
//! generate against the in-memory document store.

use chrono::NaiveDate;
use document_service::dtos::DocumentRequest;
use document_service::generator::{
    prepare_document_data, validate_data, DocumentGenerator, GeneratorSettings, TemplateRegistry,
};
use document_service::models::TemplateType;
use document_service::services::InMemoryDocStore;
use ordering_service::models::OrderTotals;
use ordering_service::numbering::{next_in_sequence, SequenceKind};
use rust_decimal_macros::dec;
use std::sync::Arc;
use workflow_tests::{test_customer, test_line_item, test_order, test_organization};

async fn test_generator() -> (Arc<InMemoryDocStore>, DocumentGenerator) {
    let store = Arc::new(InMemoryDocStore::new());
    let settings = GeneratorSettings::default();
    let registry = TemplateRegistry::default();

    for template_type in TemplateType::ALL {
        let tokens = document_service::generator::placeholders::all_placeholders(
            template_type,
            settings.max_item_slots,
        );
        store
            .register_template(
                registry.template_id(template_type).unwrap(),
                template_type.as_str(),
                tokens.join("\n"),
            )
            .await;
    }

    (store.clone(), DocumentGenerator::new(store, registry, settings))
}

#[tokio::test]
async fn order_to_quote_end_to_end() {
    let organization = test_organization();
    let customer = test_customer(organization.organization_id);

    // Numbering: first order of the year
    let order_number = next_in_sequence(SequenceKind::Order, 2025, None);
    assert_eq!(order_number, "ORD-2025-0001");

    let order_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut order = test_order(
        organization.organization_id,
        customer.customer_id,
        &order_number,
        order_date,
    );

    // Totals engine: stamp the order with totals recomputed from its items
    let items = vec![
        test_line_item(&order, "Installation", dec!(2), "uur", dec!(100.00), dec!(21), 0),
        test_line_item(&order, "Materiaal", dec!(1), "stuk", dec!(50.00), dec!(9), 1),
    ];
    assert_eq!(items[0].unit_price_incl_tax, dec!(121.00));
    assert_eq!(items[0].total_excl_tax, dec!(200.00));
    assert_eq!(items[0].total_incl_tax, dec!(242.00));

    let totals = OrderTotals::from_items(&items);
    order.subtotal_excl_tax = totals.subtotal_excl_tax;
    order.tax_total = totals.tax_total;
    order.total_incl_tax = totals.total_incl_tax;
    assert_eq!(order.total_incl_tax, dec!(296.50));

    // Document numbering: quotes run their own sequence
    let document_number = next_in_sequence(SequenceKind::Quote, 2025, None);
    assert_eq!(document_number, "OFF-2025-0001");

    // Normalize, validate, generate
    let mut request = DocumentRequest::from_order(&order, &items, &customer);
    request.document_number = document_number.clone();
    request.date = "06-08-2025".to_string();

    let organization_data = (&organization).into();
    let data = prepare_document_data(&request, &organization_data);

    // The document's totals must agree with the order's own totals
    assert_eq!(data.totals.subtotal_excl_tax, order.subtotal_excl_tax);
    assert_eq!(data.totals.tax_total, order.tax_total);
    assert_eq!(data.totals.total_incl_tax, order.total_incl_tax);

    let report = validate_data(TemplateType::Quote, &data);
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);

    let (store, generator) = test_generator().await;
    let result = generator
        .generate(TemplateType::Quote, &data)
        .await
        .expect("Failed to generate quote");

    let body = store.document_body(&result.store_document_id).await.unwrap();
    assert!(!body.contains('['), "unresolved tokens: {}", body);
    assert!(body.contains("Jansen Installatietechniek"));
    assert!(body.contains("ORD-2025-0001"));
    assert!(body.contains("OFF-2025-0001"));
    assert!(body.contains("€ 296,50"));
    assert!(body.contains("Klusbedrijf De Vries"));
}

#[tokio::test]
async fn numbering_skips_gaps_from_deleted_drafts() {
    // ORD-2025-0002 was deleted; the surviving maximum decides the next
    // number.
    let existing = ["ORD-2025-0001", "ORD-2025-0003"];
    let current_max = existing.iter().max().copied();

    let next = next_in_sequence(SequenceKind::Order, 2025, current_max);
    assert_eq!(next, "ORD-2025-0004");
}

#[tokio::test]
async fn regeneration_replaces_the_artifact_but_keeps_the_snapshot_number() {
    let organization = test_organization();
    let customer = test_customer(organization.organization_id);
    let order_date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
    let order = test_order(
        organization.organization_id,
        customer.customer_id,
        "ORD-2025-0007",
        order_date,
    );
    let items = vec![test_line_item(
        &order,
        "Onderhoud",
        dec!(3),
        "uur",
        dec!(85.00),
        dec!(21),
        0,
    )];

    let mut request = DocumentRequest::from_order(&order, &items, &customer);
    request.document_number = "FACT-2025-0001".to_string();
    request.date = "12-04-2025".to_string();

    let data = prepare_document_data(&request, &(&organization).into());
    let (store, generator) = test_generator().await;

    let first = generator
        .generate(TemplateType::Invoice, &data)
        .await
        .expect("Failed to generate invoice");

    // Regenerate from the persisted snapshot with an override
    let snapshot = serde_json::to_value(&data).unwrap();
    let (merged, second) = generator
        .regenerate(
            TemplateType::Invoice,
            &snapshot,
            Some(&serde_json::json!({"notes": "Spoedfactuur"})),
        )
        .await
        .expect("Failed to regenerate invoice");

    assert_eq!(merged.document_number, "FACT-2025-0001");
    assert_ne!(first.store_document_id, second.store_document_id);

    let body = store.document_body(&second.store_document_id).await.unwrap();
    assert!(body.contains("Spoedfactuur"));
    assert!(body.contains("FACT-2025-0001"));
}

#[tokio::test]
async fn each_template_type_generates_cleanly_from_the_same_order() {
    let organization = test_organization();
    let customer = test_customer(organization.organization_id);
    let order = test_order(
        organization.organization_id,
        customer.customer_id,
        "ORD-2025-0010",
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    );
    let items = vec![test_line_item(
        &order,
        "Inspectie",
        dec!(1),
        "stuk",
        dec!(150.00),
        dec!(21),
        0,
    )];

    let (store, generator) = test_generator().await;

    for (template_type, year) in [
        (TemplateType::Quote, 2025),
        (TemplateType::Invoice, 2025),
        (TemplateType::CombinedInvoice, 2026),
        (TemplateType::WorkOrder, 2025),
    ] {
        let mut request = DocumentRequest::from_order(&order, &items, &customer);
        request.document_number =
            next_in_sequence(template_type.sequence_kind(), year, None);
        request.date = "02-06-2025".to_string();

        let data = prepare_document_data(&request, &(&organization).into());
        let report = validate_data(template_type, &data);
        assert!(report.is_valid);

        let result = generator
            .generate(template_type, &data)
            .await
            .unwrap_or_else(|e| panic!("Failed to generate {}: {}", template_type, e));

        let body = store.document_body(&result.store_document_id).await.unwrap();
        assert!(!body.contains('['), "unresolved tokens in {}", template_type);
        assert!(body.contains(&request.document_number));
    }
}
