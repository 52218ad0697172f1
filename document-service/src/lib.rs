//! document-service: template-based document generation for the back office.
//!
//! Fills document templates (quotes, invoices, work orders) by duplicating a
//! stored template, substituting bracketed placeholder tokens with order,
//! customer and organization data, and exporting the result as an artifact.

pub mod config;
pub mod dtos;
pub mod generator;
pub mod models;
pub mod services;
