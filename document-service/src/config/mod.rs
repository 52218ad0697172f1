use serde::Deserialize;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub database: DatabaseConfig,
    pub docstore: DocStoreConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocStoreConfig {
    pub backend: DocStoreBackend,
    pub templates_path: Option<String>,
    pub work_path: Option<String>,
    pub output_path: Option<String>,
}

/// Document store backend selection. The in-memory fake is an explicit
/// configuration choice, never a silent fallback when credentials are
/// missing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DocStoreBackend {
    Memory,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub max_item_slots: usize,
}

impl DocumentConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_prod();

        Ok(DocumentConfig {
            common: common_config,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!("Invalid max_connections: {}", e))
                    })?,
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!("Invalid min_connections: {}", e))
                    })?,
            },
            docstore: DocStoreConfig {
                backend: get_env("DOCSTORE_BACKEND", Some("memory"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                templates_path: Some(get_env("DOCSTORE_TEMPLATES_PATH", Some("templates"), is_prod)?),
                work_path: Some(get_env("DOCSTORE_WORK_PATH", Some("work"), is_prod)?),
                output_path: Some(get_env("DOCSTORE_OUTPUT_PATH", Some("output"), is_prod)?),
            },
            generator: GeneratorConfig {
                max_item_slots: env::var("GENERATOR_MAX_ITEM_SLOTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
        })
    }
}

impl std::str::FromStr for DocStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(DocStoreBackend::Memory),
            "local" => Ok(DocStoreBackend::Local),
            _ => Err(format!("Invalid docstore backend: {}", s)),
        }
    }
}
