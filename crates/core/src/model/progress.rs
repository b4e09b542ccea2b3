use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::checklist::ItemKey;
use crate::model::ids::{StageId, TopicId};

/// Completion flags keyed by checklist item. A missing key means "not completed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistProgress {
    entries: BTreeMap<ItemKey, bool>,
}

impl ChecklistProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_completed(&self, key: ItemKey) -> bool {
        self.entries.get(&key).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: ItemKey, completed: bool) {
        self.entries.insert(key, completed);
    }

    /// Flips the flag for `key` and returns the new value.
    pub fn toggle(&mut self, key: ItemKey) -> bool {
        let next = !self.is_completed(key);
        self.entries.insert(key, next);
        next
    }

    pub fn retain(&mut self, mut keep: impl FnMut(ItemKey, bool) -> bool) {
        self.entries.retain(|key, completed| keep(*key, *completed));
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKey, bool)> + '_ {
        self.entries.iter().map(|(key, completed)| (*key, *completed))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ItemKey, bool)> for ChecklistProgress {
    fn from_iter<I: IntoIterator<Item = (ItemKey, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Aggregated progress for the session: per-stage percentages and the current score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProgress {
    pub current_stage: Option<StageId>,
    pub stage_progress: BTreeMap<StageId, f64>,
    pub completed_topics: Vec<TopicId>,
    pub total_score: f64,
}

/// Exportable view of a session's progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub checklist_progress: ChecklistProgress,
    #[serde(default)]
    pub user_progress: UserProgress,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
