use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ChecklistId, ItemId, TopicId};

/// A named group of weighted sub-tasks under a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: ChecklistId,
    pub topic_id: TopicId,
    pub name: String,
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    #[must_use]
    pub fn new(id: ChecklistId, topic_id: TopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            topic_id,
            name: name.into(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: ChecklistItem) -> Self {
        self.items.push(item);
        self
    }

    /// Progress keys for every item, in configuration order.
    pub fn item_keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.items
            .iter()
            .map(|item| ItemKey::new(self.id, item.id))
    }
}

/// An independently completable sub-task. `weight` scales its score contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub description: String,
    pub weight: f64,
}

impl ChecklistItem {
    #[must_use]
    pub fn new(id: ItemId, description: impl Into<String>, weight: f64) -> Self {
        Self {
            id,
            description: description.into(),
            weight,
        }
    }
}

//
// ─── PROGRESS KEY ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid checklist item key: {raw:?}")]
pub struct ItemKeyParseError {
    raw: String,
}

/// Composite key of a checklist item inside the progress map.
///
/// Exports render it as `"{checklist_id}_{item_id}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub checklist_id: ChecklistId,
    pub item_id: ItemId,
}

impl ItemKey {
    #[must_use]
    pub const fn new(checklist_id: ChecklistId, item_id: ItemId) -> Self {
        Self {
            checklist_id,
            item_id,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.checklist_id, self.item_id)
    }
}

impl FromStr for ItemKey {
    type Err = ItemKeyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ItemKeyParseError { raw: raw.to_owned() };
        let (checklist, item) = raw.split_once('_').ok_or_else(invalid)?;
        let checklist = checklist.parse::<u64>().map_err(|_| invalid())?;
        let item = item.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(ChecklistId::new(checklist), ItemId::new(item)))
    }
}

impl Serialize for ItemKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
