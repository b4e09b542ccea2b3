use serde::{Deserialize, Serialize};

use crate::model::ids::{StageId, TopicId};

/// One of the ordered phases of the guided research workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub color: String,
}

impl Stage {
    pub const DEFAULT_ICON: &'static str = "📝";
    pub const DEFAULT_COLOR: &'static str = "#4CAF50";

    /// Creates a stage with the documented display defaults.
    #[must_use]
    pub fn new(id: StageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: Self::DEFAULT_ICON.to_owned(),
            description: String::new(),
            color: Self::DEFAULT_COLOR.to_owned(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// A concrete exercise within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub stage_id: StageId,
    pub name: String,
    pub description: String,
}

impl Topic {
    #[must_use]
    pub fn new(id: TopicId, stage_id: StageId, name: impl Into<String>) -> Self {
        Self {
            id,
            stage_id,
            name: name.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
