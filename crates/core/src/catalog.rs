use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Checklist, ChecklistId, ItemId, Stage, StageId, Topic, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate stage id {0}")]
    DuplicateStage(StageId),

    #[error("duplicate topic id {0}")]
    DuplicateTopic(TopicId),

    #[error("duplicate checklist id {0}")]
    DuplicateChecklist(ChecklistId),

    #[error("checklist {checklist} has duplicate item id {item}")]
    DuplicateItem { checklist: ChecklistId, item: ItemId },

    #[error("topic {topic} references unknown stage {stage}")]
    UnknownStage { topic: TopicId, stage: StageId },

    #[error("checklist {checklist} references unknown topic {topic}")]
    UnknownTopic { checklist: ChecklistId, topic: TopicId },

    #[error("item {item} in checklist {checklist} has invalid weight {weight}")]
    InvalidWeight {
        checklist: ChecklistId,
        item: ItemId,
        weight: f64,
    },
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable stage → topic → checklist hierarchy.
///
/// Order is configuration order. Lookups by unknown ids return `None` or an
/// empty slice; the catalog never fails after construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stages: Vec<Stage>,
    topics: Vec<Topic>,
    checklists: Vec<Checklist>,
    topics_by_stage: HashMap<StageId, Vec<usize>>,
    checklists_by_topic: HashMap<TopicId, Vec<usize>>,
}

impl Catalog {
    /// Build a catalog, checking id uniqueness, references and weights.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for the first violated invariant.
    pub fn new(
        stages: Vec<Stage>,
        topics: Vec<Topic>,
        checklists: Vec<Checklist>,
    ) -> Result<Self, CatalogError> {
        let mut stage_ids = HashSet::new();
        for stage in &stages {
            if !stage_ids.insert(stage.id) {
                return Err(CatalogError::DuplicateStage(stage.id));
            }
        }

        let mut topic_ids = HashSet::new();
        let mut topics_by_stage: HashMap<StageId, Vec<usize>> = HashMap::new();
        for (idx, topic) in topics.iter().enumerate() {
            if !topic_ids.insert(topic.id) {
                return Err(CatalogError::DuplicateTopic(topic.id));
            }
            if !stage_ids.contains(&topic.stage_id) {
                return Err(CatalogError::UnknownStage {
                    topic: topic.id,
                    stage: topic.stage_id,
                });
            }
            topics_by_stage.entry(topic.stage_id).or_default().push(idx);
        }

        let mut checklist_ids = HashSet::new();
        let mut checklists_by_topic: HashMap<TopicId, Vec<usize>> = HashMap::new();
        for (idx, checklist) in checklists.iter().enumerate() {
            if !checklist_ids.insert(checklist.id) {
                return Err(CatalogError::DuplicateChecklist(checklist.id));
            }
            if !topic_ids.contains(&checklist.topic_id) {
                return Err(CatalogError::UnknownTopic {
                    checklist: checklist.id,
                    topic: checklist.topic_id,
                });
            }
            validate_items(checklist)?;
            checklists_by_topic
                .entry(checklist.topic_id)
                .or_default()
                .push(idx);
        }

        Ok(Self {
            stages,
            topics,
            checklists,
            topics_by_stage,
            checklists_by_topic,
        })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    #[must_use]
    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    #[must_use]
    pub fn checklist(&self, id: ChecklistId) -> Option<&Checklist> {
        self.checklists.iter().find(|checklist| checklist.id == id)
    }

    /// Topics of a stage in configuration order.
    #[must_use]
    pub fn topics_for_stage(&self, stage_id: StageId) -> Vec<&Topic> {
        self.topics_by_stage
            .get(&stage_id)
            .map(|indices| indices.iter().map(|&idx| &self.topics[idx]).collect())
            .unwrap_or_default()
    }

    /// Checklists of a topic in configuration order.
    #[must_use]
    pub fn checklists_for_topic(&self, topic_id: TopicId) -> Vec<&Checklist> {
        self.checklists_by_topic
            .get(&topic_id)
            .map(|indices| indices.iter().map(|&idx| &self.checklists[idx]).collect())
            .unwrap_or_default()
    }

    /// Topic owning a checklist, if the checklist is known.
    #[must_use]
    pub fn topic_of_checklist(&self, checklist_id: ChecklistId) -> Option<TopicId> {
        self.checklist(checklist_id).map(|checklist| checklist.topic_id)
    }

    /// Stage owning a checklist, resolved through its topic.
    #[must_use]
    pub fn stage_of_checklist(&self, checklist_id: ChecklistId) -> Option<StageId> {
        self.topic_of_checklist(checklist_id)
            .and_then(|topic_id| self.topic(topic_id))
            .map(|topic| topic.stage_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn validate_items(checklist: &Checklist) -> Result<(), CatalogError> {
    let mut item_ids = HashSet::new();
    for item in &checklist.items {
        if !item_ids.insert(item.id) {
            return Err(CatalogError::DuplicateItem {
                checklist: checklist.id,
                item: item.id,
            });
        }
        if !item.weight.is_finite() || item.weight < 0.0 {
            return Err(CatalogError::InvalidWeight {
                checklist: checklist.id,
                item: item.id,
                weight: item.weight,
            });
        }
    }
    Ok(())
}
