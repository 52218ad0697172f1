//! The flat data shape filled into document templates.
//!
//! Every field defaults so partial payloads (free-form callers, snapshot
//! overlays) deserialize cleanly; absent values substitute as empty strings.

use ordering_service::models::{Customer, LineItem, Order, Organization};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer identity, contact, and address fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerData {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
}

impl From<&Customer> for CustomerData {
    fn from(customer: &Customer) -> Self {
        Self {
            company_name: customer.company_name.clone(),
            contact_person: customer.contact_person.clone().unwrap_or_default(),
            email: customer.email.clone().unwrap_or_default(),
            phone: customer.phone.clone().unwrap_or_default(),
            street: customer.street.clone().unwrap_or_default(),
            postal_code: customer.postal_code.clone().unwrap_or_default(),
            city: customer.city.clone().unwrap_or_default(),
        }
    }
}

/// Originating order metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderMeta {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub status: String,
}

/// One repeating-block item slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub description: String,
    /// Missing quantity is a validation warning, so absence is preserved.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price_excl_tax: Decimal,
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub total_excl_tax: Decimal,
    #[serde(default)]
    pub total_incl_tax: Decimal,
    #[serde(default)]
    pub delivery_notes: String,
}

impl ItemData {
    pub fn tax_amount(&self) -> Decimal {
        self.total_incl_tax - self.total_excl_tax
    }
}

impl From<&LineItem> for ItemData {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: Some(item.quantity),
            unit: item.unit.clone(),
            unit_price_excl_tax: item.unit_price_excl_tax,
            tax_percentage: item.tax_percentage,
            total_excl_tax: item.total_excl_tax,
            total_incl_tax: item.total_incl_tax,
            delivery_notes: item.delivery_notes.clone().unwrap_or_default(),
        }
    }
}

/// Financial totals printed on the document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalsData {
    #[serde(default)]
    pub subtotal_excl_tax: Decimal,
    #[serde(default)]
    pub tax_total: Decimal,
    #[serde(default)]
    pub total_incl_tax: Decimal,
}

impl TotalsData {
    /// Recompute the totals from the item list: sum of excl-tax totals, sum
    /// of per-item tax, and their combination.
    pub fn from_items(items: &[ItemData]) -> Self {
        let subtotal_excl_tax: Decimal = items.iter().map(|i| i.total_excl_tax).sum();
        let tax_total: Decimal = items.iter().map(|i| i.tax_amount()).sum();
        Self {
            subtotal_excl_tax,
            tax_total,
            total_incl_tax: subtotal_excl_tax + tax_total,
        }
    }
}

/// Organization identity, contact, and fiscal registration fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub coc_number: String,
    #[serde(default)]
    pub vat_number: String,
    #[serde(default)]
    pub iban: String,
}

impl From<&Organization> for OrganizationData {
    fn from(org: &Organization) -> Self {
        Self {
            name: org.name.clone(),
            street: org.street.clone().unwrap_or_default(),
            postal_code: org.postal_code.clone().unwrap_or_default(),
            city: org.city.clone().unwrap_or_default(),
            phone: org.phone.clone().unwrap_or_default(),
            email: org.email.clone().unwrap_or_default(),
            website: org.website.clone().unwrap_or_default(),
            coc_number: org.coc_number.clone().unwrap_or_default(),
            vat_number: org.vat_number.clone().unwrap_or_default(),
            iban: org.iban.clone().unwrap_or_default(),
        }
    }
}

/// Caller-supplied generation input: a full order snapshot or free-form
/// fields. Normalized into [`DocumentData`] by
/// [`prepare_document_data`](crate::generator::prepare_document_data).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub customer: CustomerData,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<ItemData>,
}

impl DocumentRequest {
    /// Assemble a request from a persisted order with its items and
    /// customer. The document number is assigned separately by the caller.
    pub fn from_order(order: &Order, items: &[LineItem], customer: &Customer) -> Self {
        Self {
            customer: customer.into(),
            order_number: order.order_number.clone(),
            order_date: order.order_date.format("%d-%m-%Y").to_string(),
            status: order.status.clone(),
            document_number: String::new(),
            date: String::new(),
            description: order.description.clone().unwrap_or_default(),
            notes: order.notes.clone().unwrap_or_default(),
            items: items.iter().map(ItemData::from).collect(),
        }
    }
}

/// The normalized flat structure a template is filled from. Fixed top-level
/// keys; persisted verbatim as the generation snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(default)]
    pub customer: CustomerData,
    #[serde(default)]
    pub order: OrderMeta,
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub totals: TotalsData,
    #[serde(default)]
    pub organization: OrganizationData,
}
