//! Services for document-service.

pub mod database;
pub mod docstore;
pub mod metrics;

pub use database::Database;
pub use docstore::{
    DocMetadata, DocumentStore, ExportedArtifact, InMemoryDocStore, LocalDocStore, Replacement,
};
pub use metrics::{get_metrics, init_metrics};
