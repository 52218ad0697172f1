//! Customer model for ordering-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer with flattened billing address fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: Uuid,
    pub organization_id: Uuid,
    pub customer_number: Option<String>,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub payment_terms_days: i32,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub organization_id: Uuid,
    pub customer_number: Option<String>,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub payment_terms_days: i32,
    pub notes: Option<String>,
}

/// Input for updating a customer. Field-by-field allow list.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub payment_terms_days: Option<i32>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}
