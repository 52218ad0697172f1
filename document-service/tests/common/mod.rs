//! Shared fixtures for document-service integration tests.

use document_service::dtos::{CustomerData, DocumentRequest, ItemData, OrganizationData};
use document_service::generator::{DocumentGenerator, GeneratorSettings, TemplateRegistry};
use document_service::models::TemplateType;
use document_service::services::InMemoryDocStore;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub fn sample_customer() -> CustomerData {
    CustomerData {
        company_name: "Jansen Installatietechniek".to_string(),
        contact_person: "P. Jansen".to_string(),
        email: "info@jansen.nl".to_string(),
        phone: "020-1234567".to_string(),
        street: "Keizersgracht 1".to_string(),
        postal_code: "1015 CC".to_string(),
        city: "Amsterdam".to_string(),
    }
}

pub fn sample_organization() -> OrganizationData {
    OrganizationData {
        name: "Klusbedrijf De Vries".to_string(),
        street: "Dorpsstraat 12".to_string(),
        postal_code: "3421 AB".to_string(),
        city: "Oudewater".to_string(),
        phone: "0348-561234".to_string(),
        email: "info@devries.nl".to_string(),
        website: "www.devries.nl".to_string(),
        coc_number: "12345678".to_string(),
        vat_number: "NL001234567B01".to_string(),
        iban: "NL02ABNA0123456789".to_string(),
    }
}

pub fn sample_items() -> Vec<ItemData> {
    vec![
        ItemData {
            description: "Installation".to_string(),
            quantity: Some(dec!(2)),
            unit: "uur".to_string(),
            unit_price_excl_tax: dec!(100.00),
            tax_percentage: dec!(21),
            total_excl_tax: dec!(200.00),
            total_incl_tax: dec!(242.00),
            delivery_notes: String::new(),
        },
        ItemData {
            description: "Materiaal".to_string(),
            quantity: Some(dec!(1)),
            unit: "stuk".to_string(),
            unit_price_excl_tax: dec!(50.00),
            tax_percentage: dec!(9),
            total_excl_tax: dec!(50.00),
            total_incl_tax: dec!(54.50),
            delivery_notes: "Levering op locatie".to_string(),
        },
    ]
}

pub fn sample_request(document_number: &str) -> DocumentRequest {
    DocumentRequest {
        customer: sample_customer(),
        order_number: "ORD-2025-0001".to_string(),
        order_date: "01-03-2025".to_string(),
        status: "confirmed".to_string(),
        document_number: document_number.to_string(),
        date: "06-08-2025".to_string(),
        description: "Vervanging CV-ketel".to_string(),
        notes: "Binnen 2 weken".to_string(),
        items: sample_items(),
    }
}

/// A generator over an in-memory store where each template body declares
/// its full placeholder set, so any surviving token is visible.
pub async fn generator_with_full_templates() -> (Arc<InMemoryDocStore>, DocumentGenerator) {
    let store = Arc::new(InMemoryDocStore::new());
    let settings = GeneratorSettings::default();
    let registry = TemplateRegistry::default();

    for template_type in TemplateType::ALL {
        let tokens =
            document_service::generator::placeholders::all_placeholders(template_type, settings.max_item_slots);
        store
            .register_template(
                registry.template_id(template_type).unwrap(),
                template_type.as_str(),
                tokens.join("\n"),
            )
            .await;
    }

    let generator = DocumentGenerator::new(store.clone(), registry, settings);
    (store, generator)
}
