//! Raw dataset shapes and their conversion into domain records.

use paper_core::model::{
    ChatConfig, Checklist, ChecklistId, ChecklistItem, ItemId, Stage, StageId, Topic, TopicId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::repository::StorageError;

pub(crate) fn decode<T: DeserializeOwned>(file: &'static str, value: Value) -> Result<T, StorageError> {
    serde_json::from_value(value).map_err(|e| StorageError::Malformed {
        file,
        reason: e.to_string(),
    })
}

fn default_icon() -> String {
    Stage::DEFAULT_ICON.to_owned()
}

fn default_color() -> String {
    Stage::DEFAULT_COLOR.to_owned()
}

//
// ─── STAGES / TOPICS / CHECKLISTS ──────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StagesFile {
    #[serde(default)]
    pub stages: Vec<StageRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default = "default_icon")]
    icon: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_color")]
    color: String,
}

impl From<StageRecord> for Stage {
    fn from(record: StageRecord) -> Self {
        Stage::new(StageId::new(record.id), record.name)
            .with_icon(record.icon)
            .with_description(record.description)
            .with_color(record.color)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopicsFile {
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicRecord {
    id: u64,
    stage_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

impl From<TopicRecord> for Topic {
    fn from(record: TopicRecord) -> Self {
        Topic::new(
            TopicId::new(record.id),
            StageId::new(record.stage_id),
            record.name,
        )
        .with_description(record.description)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChecklistsFile {
    #[serde(default)]
    pub checklists: Vec<ChecklistRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChecklistRecord {
    id: u64,
    topic_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    id: u64,
    #[serde(default, alias = "content", alias = "text")]
    description: String,
    #[serde(default)]
    weight: f64,
}

impl From<ChecklistRecord> for Checklist {
    fn from(record: ChecklistRecord) -> Self {
        let mut checklist = Checklist::new(
            ChecklistId::new(record.id),
            TopicId::new(record.topic_id),
            record.name,
        );
        checklist.items = record
            .items
            .into_iter()
            .map(|item| ChecklistItem::new(ItemId::new(item.id), item.description, item.weight))
            .collect();
        checklist
    }
}

//
// ─── CHAT CONFIG ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatConfigFile {
    #[serde(default)]
    chat_interface: ChatInterfaceRecord,
}

#[derive(Debug, Default, Deserialize)]
struct ChatInterfaceRecord {
    model_name: Option<String>,
    model_url: Option<String>,
    #[serde(default)]
    interface_params: InterfaceParamsRecord,
}

#[derive(Debug, Default, Deserialize)]
struct InterfaceParamsRecord {
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
}

impl From<ChatConfigFile> for ChatConfig {
    fn from(file: ChatConfigFile) -> Self {
        let defaults = ChatConfig::default();
        let chat = file.chat_interface;
        let params = chat.interface_params;
        ChatConfig {
            model_name: chat.model_name.unwrap_or(defaults.model_name),
            model_url: chat.model_url.unwrap_or(defaults.model_url),
            temperature: params.temperature.unwrap_or(defaults.temperature),
            max_tokens: params.max_tokens.unwrap_or(defaults.max_tokens),
            system_prompt: params.system_prompt.unwrap_or(defaults.system_prompt),
        }
    }
}
