use paper_core::model::{ChatConfig, Checklist, Stage, StageId, Topic, TopicId};
use paper_core::{Catalog, CatalogError};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by configuration stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {file}: {reason}")]
    Malformed { file: &'static str, reason: String },

    #[error(transparent)]
    InvalidCatalog(#[from] CatalogError),
}

/// Read-only access to the configuration datasets.
///
/// Implementations load once and serve every lookup from memory. Lookups for
/// unknown ids return empty results instead of errors.
pub trait ConfigRepository: Send + Sync {
    fn catalog(&self) -> &Catalog;

    /// Free-form UI configuration (titles, labels).
    fn ui_config(&self) -> &Value;

    fn chat_config(&self) -> &ChatConfig;

    /// Free-form function panel configuration.
    fn function_panel_config(&self) -> &Value;

    fn stages(&self) -> &[Stage] {
        self.catalog().stages()
    }

    fn topics_by_stage(&self, stage_id: StageId) -> Vec<&Topic> {
        self.catalog().topics_for_stage(stage_id)
    }

    fn checklists_by_topic(&self, topic_id: TopicId) -> Vec<&Checklist> {
        self.catalog().checklists_for_topic(topic_id)
    }
}

/// Simple in-memory store for tests and embedding.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    catalog: Catalog,
    ui_config: Value,
    chat_config: ChatConfig,
    function_panel_config: Value,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new(Catalog::empty())
    }
}

impl InMemoryRepository {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ui_config: empty_object(),
            chat_config: ChatConfig::default(),
            function_panel_config: empty_object(),
        }
    }

    /// Build a repository from raw records, validating the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidCatalog` if ids or references are inconsistent.
    pub fn from_records(
        stages: Vec<Stage>,
        topics: Vec<Topic>,
        checklists: Vec<Checklist>,
    ) -> Result<Self, StorageError> {
        Ok(Self::new(Catalog::new(stages, topics, checklists)?))
    }

    #[must_use]
    pub fn with_chat_config(mut self, chat_config: ChatConfig) -> Self {
        self.chat_config = chat_config;
        self
    }

    #[must_use]
    pub fn with_ui_config(mut self, ui_config: Value) -> Self {
        self.ui_config = ui_config;
        self
    }

    #[must_use]
    pub fn with_function_panel_config(mut self, config: Value) -> Self {
        self.function_panel_config = config;
        self
    }
}

impl ConfigRepository for InMemoryRepository {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn ui_config(&self) -> &Value {
        &self.ui_config
    }

    fn chat_config(&self) -> &ChatConfig {
        &self.chat_config
    }

    fn function_panel_config(&self) -> &Value {
        &self.function_panel_config
    }
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Configuration store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub config: Arc<dyn ConfigRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(repo: InMemoryRepository) -> Self {
        Self {
            config: Arc::new(repo),
        }
    }

    /// Load every dataset from an assets directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a present dataset cannot be read or is inconsistent.
    pub fn json_assets(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let repo = crate::assets::JsonAssetRepository::open(dir)?;
        Ok(Self {
            config: Arc::new(repo),
        })
    }
}
