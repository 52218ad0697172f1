//! Data transfer objects for document generation.

mod generation;

pub use generation::{
    CustomerData, DocumentData, DocumentRequest, ItemData, OrderMeta, OrganizationData,
    TotalsData,
};
