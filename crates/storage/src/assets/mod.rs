use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use paper_core::Catalog;
use paper_core::model::{ChatConfig, Checklist, Stage, Topic};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::repository::{ConfigRepository, StorageError, empty_object};

mod mapping;

use mapping::{ChatConfigFile, ChecklistsFile, StagesFile, TopicsFile, decode};

pub const STAGES_FILE: &str = "stages.json";
pub const TOPICS_FILE: &str = "topics.json";
pub const CHECKLISTS_FILE: &str = "checklists.json";
pub const UI_CONFIG_FILE: &str = "ui_config.json";
pub const CHAT_CONFIG_FILE: &str = "chat_config.json";
pub const FUNCTION_PANEL_CONFIG_FILE: &str = "function_panel_config.json";

/// Configuration store backed by JSON files in an assets directory.
///
/// Every dataset is read once in [`JsonAssetRepository::open`] and served from
/// memory afterwards. A missing or unparseable file is treated as an empty
/// dataset.
#[derive(Debug, Clone)]
pub struct JsonAssetRepository {
    dir: PathBuf,
    catalog: Catalog,
    ui_config: Value,
    chat_config: ChatConfig,
    function_panel_config: Value,
}

impl JsonAssetRepository {
    /// Load and validate every dataset under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` for unreadable files other than missing ones,
    /// `StorageError::Malformed` when a record lacks required fields, and
    /// `StorageError::InvalidCatalog` when references between files are broken.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        let stages: StagesFile = decode(STAGES_FILE, read_dataset(&dir, STAGES_FILE)?)?;
        let topics: TopicsFile = decode(TOPICS_FILE, read_dataset(&dir, TOPICS_FILE)?)?;
        let checklists: ChecklistsFile =
            decode(CHECKLISTS_FILE, read_dataset(&dir, CHECKLISTS_FILE)?)?;
        let chat: ChatConfigFile = decode(CHAT_CONFIG_FILE, read_dataset(&dir, CHAT_CONFIG_FILE)?)?;

        let catalog = Catalog::new(
            stages.stages.into_iter().map(Stage::from).collect(),
            topics.topics.into_iter().map(Topic::from).collect(),
            checklists
                .checklists
                .into_iter()
                .map(Checklist::from)
                .collect(),
        )?;

        info!(
            dir = %dir.display(),
            stages = catalog.stages().len(),
            "loaded configuration datasets"
        );

        Ok(Self {
            ui_config: read_dataset(&dir, UI_CONFIG_FILE)?,
            function_panel_config: read_dataset(&dir, FUNCTION_PANEL_CONFIG_FILE)?,
            chat_config: ChatConfig::from(chat),
            catalog,
            dir,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ConfigRepository for JsonAssetRepository {
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

fn read_dataset(dir: &Path, file: &'static str) -> Result<Value, StorageError> {
    let path = dir.join(file);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "dataset not found, using empty mapping");
            return Ok(empty_object());
        }
        Err(source) => return Err(StorageError::Io { path, source }),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!(path = %path.display(), "dataset loaded");
            Ok(value)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dataset is not valid JSON, using empty mapping");
            Ok(empty_object())
        }
    }
}
