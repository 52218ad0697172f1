//! Organization (tenant) model for ordering-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The owning organization: identity, contact, and fiscal registration
/// fields as they appear on generated documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub coc_number: Option<String>,
    pub vat_number: Option<String>,
    pub iban: Option<String>,
    pub created_utc: DateTime<Utc>,
}
