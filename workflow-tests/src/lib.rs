//! Shared fixtures for cross-service workflow tests.
//!
//! Builds domain objects in memory; the document store side runs against
//! the in-memory backend, so these tests need no external services.

use chrono::{NaiveDate, Utc};
use ordering_service::models::{Customer, LineItem, LineItemAmounts, Order, Organization};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn test_organization() -> Organization {
    Organization {
        organization_id: Uuid::new_v4(),
        name: "Klusbedrijf De Vries".to_string(),
        street: Some("Dorpsstraat 12".to_string()),
        postal_code: Some("3421 AB".to_string()),
        city: Some("Oudewater".to_string()),
        country: Some("Nederland".to_string()),
        phone: Some("0348-561234".to_string()),
        email: Some("info@devries.nl".to_string()),
        website: Some("www.devries.nl".to_string()),
        coc_number: Some("12345678".to_string()),
        vat_number: Some("NL001234567B01".to_string()),
        iban: Some("NL02ABNA0123456789".to_string()),
        created_utc: Utc::now(),
    }
}

pub fn test_customer(organization_id: Uuid) -> Customer {
    Customer {
        customer_id: Uuid::new_v4(),
        organization_id,
        customer_number: Some("K-0042".to_string()),
        company_name: "Jansen Installatietechniek".to_string(),
        contact_person: Some("P. Jansen".to_string()),
        email: Some("info@jansen.nl".to_string()),
        phone: Some("020-1234567".to_string()),
        street: Some("Keizersgracht 1".to_string()),
        postal_code: Some("1015 CC".to_string()),
        city: Some("Amsterdam".to_string()),
        country: Some("Nederland".to_string()),
        vat_number: Some("NL998877665B01".to_string()),
        payment_terms_days: 30,
        notes: None,
        is_active: true,
        created_utc: Utc::now(),
    }
}

pub fn test_order(
    organization_id: Uuid,
    customer_id: Uuid,
    order_number: &str,
    order_date: NaiveDate,
) -> Order {
    Order {
        order_id: Uuid::new_v4(),
        organization_id,
        customer_id,
        order_number: order_number.to_string(),
        order_date,
        description: Some("Vervanging CV-ketel".to_string()),
        status: "confirmed".to_string(),
        subtotal_excl_tax: Decimal::ZERO,
        tax_total: Decimal::ZERO,
        total_incl_tax: Decimal::ZERO,
        notes: Some("Binnen 2 weken".to_string()),
        created_by: None,
        assigned_to: None,
        created_utc: Utc::now(),
    }
}

/// Build a line item with its derived fields computed, the way the
/// persistence layer does on insert.
pub fn test_line_item(
    order: &Order,
    description: &str,
    quantity: Decimal,
    unit: &str,
    unit_price_excl_tax: Decimal,
    tax_percentage: Decimal,
    sort_order: i32,
) -> LineItem {
    let amounts = LineItemAmounts::compute(quantity, unit_price_excl_tax, tax_percentage);
    LineItem {
        line_item_id: Uuid::new_v4(),
        order_id: order.order_id,
        organization_id: order.organization_id,
        description: description.to_string(),
        quantity,
        unit: unit.to_string(),
        unit_price_excl_tax,
        unit_price_incl_tax: amounts.unit_price_incl_tax,
        tax_percentage,
        total_excl_tax: amounts.total_excl_tax,
        total_incl_tax: amounts.total_incl_tax,
        delivery_notes: None,
        sort_order,
        created_utc: Utc::now(),
    }
}
