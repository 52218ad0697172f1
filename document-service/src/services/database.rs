//! Database service for document-service.

use crate::models::{
    CreateGeneratedDocument, DocumentStatus, GeneratedDocument, ListDocumentsFilter, TemplateType,
};
use crate::services::metrics::DB_QUERY_DURATION;
use ordering_service::numbering::next_in_sequence;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = r#"document_id, organization_id, order_id, customer_id,
    template_type, document_number, file_name, store_document_id, artifact_url, status,
    generation_data, sent_at, sent_to, created_by, created_utc"#;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "document-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sequence Number Allocation
    // -------------------------------------------------------------------------

    /// Allocate the next document number for an organization, template type
    /// and year.
    ///
    /// Max-based scan, no lock: concurrent callers can collide and the
    /// unique index on (organization_id, document_number) rejects the
    /// second insert with a retryable conflict.
    #[instrument(skip(self), fields(organization_id = %organization_id, template_type = %template_type, year = year))]
    pub async fn allocate_document_number(
        &self,
        organization_id: Uuid,
        template_type: TemplateType,
        year: i32,
    ) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["allocate_document_number"])
            .start_timer();

        let kind = template_type.sequence_kind();
        let current_max: Option<String> = sqlx::query_scalar(
            r#"
            SELECT MAX(document_number)
            FROM generated_documents
            WHERE organization_id = $1 AND document_number LIKE $2
            "#,
        )
        .bind(organization_id)
        .bind(kind.pattern(year))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to scan document numbers: {}", e))
        })?;

        timer.observe_duration();

        Ok(next_in_sequence(kind, year, current_max.as_deref()))
    }

    // -------------------------------------------------------------------------
    // Generated Document Operations
    // -------------------------------------------------------------------------

    /// Record a generation run. A duplicate document number surfaces as a
    /// retryable conflict; the caller should re-allocate and retry.
    #[instrument(skip(self, input), fields(organization_id = %input.organization_id, document_number = %input.document_number))]
    pub async fn create_generated_document(
        &self,
        input: &CreateGeneratedDocument,
    ) -> Result<GeneratedDocument, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_generated_document"])
            .start_timer();

        let document_id = Uuid::new_v4();
        let document = sqlx::query_as::<_, GeneratedDocument>(&format!(
            r#"
            INSERT INTO generated_documents (document_id, organization_id, order_id, customer_id,
                template_type, document_number, file_name, store_document_id, artifact_url,
                status, generation_data, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'draft', $10, $11)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(document_id)
        .bind(input.organization_id)
        .bind(input.order_id)
        .bind(input.customer_id)
        .bind(input.template_type.as_str())
        .bind(&input.document_number)
        .bind(&input.file_name)
        .bind(&input.store_document_id)
        .bind(&input.artifact_url)
        .bind(&input.generation_data)
        .bind(input.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Document number '{}' already exists",
                    input.document_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!(
                "Failed to create generated document: {}",
                e
            )),
        })?;

        timer.observe_duration();

        info!(
            document_id = %document.document_id,
            document_number = %document.document_number,
            "Generated document recorded"
        );

        Ok(document)
    }

    /// Get a generated document by ID.
    #[instrument(skip(self), fields(organization_id = %organization_id, document_id = %document_id))]
    pub async fn get_document(
        &self,
        organization_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<GeneratedDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_document"])
            .start_timer();

        let document = sqlx::query_as::<_, GeneratedDocument>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS}
            FROM generated_documents
            WHERE organization_id = $1 AND document_id = $2
            "#
        ))
        .bind(organization_id)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get document: {}", e)))?;

        timer.observe_duration();

        Ok(document)
    }

    /// List generated documents for an organization.
    #[instrument(skip(self, filter), fields(organization_id = %organization_id))]
    pub async fn list_documents(
        &self,
        organization_id: Uuid,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<GeneratedDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_documents"])
            .start_timer();

        let limit = filter.page_size.clamp(1, 100) as i64;
        let template_type = filter.template_type.map(|t| t.as_str().to_string());
        let status = filter.status.map(|s| s.as_str().to_string());

        let documents = if let Some(cursor) = filter.page_token {
            sqlx::query_as::<_, GeneratedDocument>(&format!(
                r#"
                SELECT {DOCUMENT_COLUMNS}
                FROM generated_documents
                WHERE organization_id = $1
                  AND ($2::text IS NULL OR template_type = $2)
                  AND ($3::uuid IS NULL OR order_id = $3)
                  AND ($4::text IS NULL OR status = $4)
                  AND document_id > $5
                ORDER BY document_id
                LIMIT $6
                "#
            ))
            .bind(organization_id)
            .bind(&template_type)
            .bind(filter.order_id)
            .bind(&status)
            .bind(cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, GeneratedDocument>(&format!(
                r#"
                SELECT {DOCUMENT_COLUMNS}
                FROM generated_documents
                WHERE organization_id = $1
                  AND ($2::text IS NULL OR template_type = $2)
                  AND ($3::uuid IS NULL OR order_id = $3)
                  AND ($4::text IS NULL OR status = $4)
                ORDER BY document_id
                LIMIT $5
                "#
            ))
            .bind(organization_id)
            .bind(&template_type)
            .bind(filter.order_id)
            .bind(&status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        timer.observe_duration();

        Ok(documents)
    }

    /// Replace the artifact references and snapshot after a regeneration.
    /// The document number and template type stay as they are.
    #[instrument(skip(self, generation_data), fields(organization_id = %organization_id, document_id = %document_id))]
    pub async fn update_generated_artifact(
        &self,
        organization_id: Uuid,
        document_id: Uuid,
        store_document_id: &str,
        artifact_url: &str,
        generation_data: &serde_json::Value,
    ) -> Result<Option<GeneratedDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_generated_artifact"])
            .start_timer();

        let document = sqlx::query_as::<_, GeneratedDocument>(&format!(
            r#"
            UPDATE generated_documents
            SET store_document_id = $3,
                artifact_url = $4,
                generation_data = $5
            WHERE organization_id = $1 AND document_id = $2
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(document_id)
        .bind(store_document_id)
        .bind(artifact_url)
        .bind(generation_data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update document artifact: {}", e))
        })?;

        timer.observe_duration();

        Ok(document)
    }

    /// Update a document's status; `sent` also records when and to whom.
    #[instrument(skip(self), fields(organization_id = %organization_id, document_id = %document_id))]
    pub async fn update_document_status(
        &self,
        organization_id: Uuid,
        document_id: Uuid,
        status: DocumentStatus,
        sent_to: Option<&str>,
    ) -> Result<Option<GeneratedDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_document_status"])
            .start_timer();

        let document = sqlx::query_as::<_, GeneratedDocument>(&format!(
            r#"
            UPDATE generated_documents
            SET status = $3,
                sent_at = CASE WHEN $3 = 'sent' THEN NOW() ELSE sent_at END,
                sent_to = COALESCE($4, sent_to)
            WHERE organization_id = $1 AND document_id = $2
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(document_id)
        .bind(status.as_str())
        .bind(sent_to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update document status: {}", e))
        })?;

        timer.observe_duration();

        Ok(document)
    }

    /// Delete a generated document record. The exported artifact in the
    /// document store is left in place.
    #[instrument(skip(self), fields(organization_id = %organization_id, document_id = %document_id))]
    pub async fn delete_document(
        &self,
        organization_id: Uuid,
        document_id: Uuid,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_document"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM generated_documents
            WHERE organization_id = $1 AND document_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(document_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete document: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }
}
