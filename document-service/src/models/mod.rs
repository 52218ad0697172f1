//! Domain models for document-service.

mod document;

pub use document::{
    CreateGeneratedDocument, DocumentStatus, GeneratedDocument, GenerationResult,
    ListDocumentsFilter, TemplateType,
};
