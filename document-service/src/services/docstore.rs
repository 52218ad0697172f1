//! Document store capability interface.
//!
//! The generator needs four operations from its template/document backend:
//! duplicate a template, batch-replace placeholder tokens, export a filled
//! document, and read template metadata. Any backend satisfying this
//! contract is substitutable; selection happens through configuration, not
//! runtime fallbacks inside business logic.
//!
//! Templates are never mutated: every generation duplicates the template
//! into a fresh working document first, so concurrent generations against
//! the same template are independent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::RwLock;

/// One placeholder substitution. The token is matched case-insensitively as
/// a whole bracketed token, globally.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub token: String,
    pub value: String,
}

impl Replacement {
    pub fn new(token: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            value: value.into(),
        }
    }
}

/// Template metadata.
#[derive(Debug, Clone)]
pub struct DocMetadata {
    pub id: String,
    pub name: String,
    pub modified_utc: Option<DateTime<Utc>>,
}

/// Reference to an exported artifact.
#[derive(Debug, Clone)]
pub struct ExportedArtifact {
    pub url: String,
    pub file_name: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Duplicate a template into a fresh document named `new_name`; returns
    /// the new document's id. The template itself is left untouched.
    async fn duplicate(&self, template_id: &str, new_name: &str) -> Result<String, AppError>;

    /// Apply a batch of replacements to a document. Returns the number of
    /// token occurrences replaced.
    async fn replace_all(
        &self,
        document_id: &str,
        replacements: &[Replacement],
    ) -> Result<usize, AppError>;

    /// Export a filled document under `file_name` and return a stable
    /// retrieval reference. A failed run's working document is left in
    /// place; no compensating delete is performed.
    async fn export(&self, document_id: &str, file_name: &str)
        -> Result<ExportedArtifact, AppError>;

    /// Read metadata for a template.
    async fn get_metadata(&self, template_id: &str) -> Result<DocMetadata, AppError>;
}

/// Case-insensitive whole-token global replace. Returns the rewritten text
/// and the number of occurrences replaced. Tokens are ASCII
/// (`[LoopART_Aantal1]` and the like), so ASCII case folding suffices and
/// byte offsets into the folded text are valid in the original.
pub fn replace_token_ci(haystack: &str, token: &str, value: &str) -> (String, usize) {
    if token.is_empty() {
        return (haystack.to_string(), 0);
    }

    let folded_hay = haystack.to_ascii_lowercase();
    let folded_token = token.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut count = 0;
    let mut pos = 0;
    while let Some(found) = folded_hay[pos..].find(&folded_token) {
        let start = pos + found;
        out.push_str(&haystack[pos..start]);
        out.push_str(value);
        pos = start + folded_token.len();
        count += 1;
    }
    out.push_str(&haystack[pos..]);
    (out, count)
}

fn apply_replacements(body: &str, replacements: &[Replacement]) -> (String, usize) {
    let mut text = body.to_string();
    let mut total = 0;
    for replacement in replacements {
        let (rewritten, count) = replace_token_ci(&text, &replacement.token, &replacement.value);
        text = rewritten;
        total += count;
    }
    (text, total)
}

#[derive(Debug, Clone)]
struct StoredDoc {
    name: String,
    body: String,
    modified_utc: DateTime<Utc>,
}

/// In-memory document store: the explicit fake used in tests and local
/// development, registered templates and all.
#[derive(Default)]
pub struct InMemoryDocStore {
    templates: RwLock<HashMap<String, StoredDoc>>,
    documents: RwLock<HashMap<String, StoredDoc>>,
    exports: RwLock<HashMap<String, String>>,
    counter: AtomicU64,
}

impl InMemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template body under an id.
    pub async fn register_template(
        &self,
        template_id: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.templates.write().await.insert(
            template_id.into(),
            StoredDoc {
                name: name.into(),
                body: body.into(),
                modified_utc: Utc::now(),
            },
        );
    }

    /// Current body of a working document (test hook).
    pub async fn document_body(&self, document_id: &str) -> Option<String> {
        self.documents
            .read()
            .await
            .get(document_id)
            .map(|doc| doc.body.clone())
    }

    /// Body of an exported artifact by file name (test hook).
    pub async fn exported_body(&self, file_name: &str) -> Option<String> {
        self.exports.read().await.get(file_name).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocStore {
    async fn duplicate(&self, template_id: &str, new_name: &str) -> Result<String, AppError> {
        let template = {
            let templates = self.templates.read().await;
            templates.get(template_id).cloned()
        };
        let template = template.ok_or_else(|| {
            AppError::DocStoreError(anyhow::anyhow!("Template '{}' not found", template_id))
        })?;

        let document_id = format!("doc-{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        self.documents.write().await.insert(
            document_id.clone(),
            StoredDoc {
                name: new_name.to_string(),
                body: template.body,
                modified_utc: Utc::now(),
            },
        );
        Ok(document_id)
    }

    async fn replace_all(
        &self,
        document_id: &str,
        replacements: &[Replacement],
    ) -> Result<usize, AppError> {
        let mut documents = self.documents.write().await;
        let doc = documents.get_mut(document_id).ok_or_else(|| {
            AppError::DocStoreError(anyhow::anyhow!("Document '{}' not found", document_id))
        })?;

        let (body, count) = apply_replacements(&doc.body, replacements);
        doc.body = body;
        doc.modified_utc = Utc::now();
        Ok(count)
    }

    async fn export(
        &self,
        document_id: &str,
        file_name: &str,
    ) -> Result<ExportedArtifact, AppError> {
        let body = self.document_body(document_id).await.ok_or_else(|| {
            AppError::DocStoreError(anyhow::anyhow!("Document '{}' not found", document_id))
        })?;

        self.exports
            .write()
            .await
            .insert(file_name.to_string(), body);

        Ok(ExportedArtifact {
            url: format!("memory://exports/{}", file_name),
            file_name: file_name.to_string(),
        })
    }

    async fn get_metadata(&self, template_id: &str) -> Result<DocMetadata, AppError> {
        let templates = self.templates.read().await;
        let template = templates.get(template_id).ok_or_else(|| {
            AppError::DocStoreError(anyhow::anyhow!("Template '{}' not found", template_id))
        })?;

        Ok(DocMetadata {
            id: template_id.to_string(),
            name: template.name.clone(),
            modified_utc: Some(template.modified_utc),
        })
    }
}

/// Filesystem-backed document store. Templates are files under
/// `templates_dir`; working copies land in `work_dir` and exported
/// artifacts in `output_dir`. The export step stores the filled body
/// verbatim; rendering to the final portable format is the concern of a
/// production document backend behind the same trait.
pub struct LocalDocStore {
    templates_dir: PathBuf,
    work_dir: PathBuf,
    output_dir: PathBuf,
}

impl LocalDocStore {
    pub async fn new(
        templates_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let templates_dir = templates_dir.into();
        let work_dir = work_dir.into();
        let output_dir = output_dir.into();
        for dir in [&templates_dir, &work_dir, &output_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir).await?;
            }
        }
        Ok(Self {
            templates_dir,
            work_dir,
            output_dir,
        })
    }
}

#[async_trait]
impl DocumentStore for LocalDocStore {
    async fn duplicate(&self, template_id: &str, new_name: &str) -> Result<String, AppError> {
        let template_path = self.templates_dir.join(template_id);
        let body = fs::read_to_string(&template_path).await.map_err(|e| {
            AppError::DocStoreError(anyhow::anyhow!(
                "Failed to read template '{}': {}",
                template_id,
                e
            ))
        })?;

        let document_id = format!("{}.txt", new_name);
        fs::write(self.work_dir.join(&document_id), body)
            .await
            .map_err(|e| {
                AppError::DocStoreError(anyhow::anyhow!("Failed to copy template: {}", e))
            })?;
        Ok(document_id)
    }

    async fn replace_all(
        &self,
        document_id: &str,
        replacements: &[Replacement],
    ) -> Result<usize, AppError> {
        let path = self.work_dir.join(document_id);
        let body = fs::read_to_string(&path).await.map_err(|e| {
            AppError::DocStoreError(anyhow::anyhow!(
                "Failed to read document '{}': {}",
                document_id,
                e
            ))
        })?;

        let (rewritten, count) = apply_replacements(&body, replacements);
        fs::write(&path, rewritten).await.map_err(|e| {
            AppError::DocStoreError(anyhow::anyhow!("Failed to write document: {}", e))
        })?;
        Ok(count)
    }

    async fn export(
        &self,
        document_id: &str,
        file_name: &str,
    ) -> Result<ExportedArtifact, AppError> {
        let body = fs::read_to_string(self.work_dir.join(document_id))
            .await
            .map_err(|e| {
                AppError::DocStoreError(anyhow::anyhow!(
                    "Failed to read document '{}': {}",
                    document_id,
                    e
                ))
            })?;

        let output_path = self.output_dir.join(file_name);
        fs::write(&output_path, body).await.map_err(|e| {
            AppError::DocStoreError(anyhow::anyhow!("Failed to export document: {}", e))
        })?;

        Ok(ExportedArtifact {
            url: format!("file://{}", output_path.display()),
            file_name: file_name.to_string(),
        })
    }

    async fn get_metadata(&self, template_id: &str) -> Result<DocMetadata, AppError> {
        let path = self.templates_dir.join(template_id);
        let metadata = fs::metadata(&path).await.map_err(|e| {
            AppError::DocStoreError(anyhow::anyhow!(
                "Failed to stat template '{}': {}",
                template_id,
                e
            ))
        })?;

        let modified_utc = metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(DocMetadata {
            id: template_id.to_string(),
            name: template_id.to_string(),
            modified_utc,
        })
    }
}
