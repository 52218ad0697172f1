use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    /// Retryable: the caller should re-allocate and retry the write.
    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Unknown template type: {0}")]
    UnknownTemplate(String),

    #[error("Document generation failed: {0}")]
    GenerationFailed(#[source] anyhow::Error),

    #[error("Document store error: {0}")]
    DocStoreError(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures the caller is expected to retry after corrective
    /// action (currently only sequence-number allocation conflicts).
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}
