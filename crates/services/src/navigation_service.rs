use std::sync::Arc;

use paper_core::model::{Checklist, Stage, StageId, Topic, TopicId};
use storage::ConfigRepository;
use tracing::info;

use crate::error::{NavigationError, ValidationError};
use crate::progress_service::ProgressTracker;
use crate::session::{Page, SessionState};

/// Moves a session between stages and topics.
#[derive(Clone)]
pub struct Navigator {
    config: Arc<dyn ConfigRepository>,
    progress: ProgressTracker,
}

impl Navigator {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigRepository>, progress: ProgressTracker) -> Self {
        Self { config, progress }
    }

    /// All stages in display order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        self.config.stages()
    }

    /// Topics of the selected stage; empty when no stage is selected.
    #[must_use]
    pub fn topics(&self, state: &SessionState) -> Vec<&Topic> {
        state
            .selected_stage()
            .map(|stage| self.config.topics_by_stage(stage.id))
            .unwrap_or_default()
    }

    /// Checklists of the selected topic; empty when no topic is selected.
    #[must_use]
    pub fn checklists(&self, state: &SessionState) -> Vec<&Checklist> {
        state
            .selected_topic()
            .map(|topic| self.config.checklists_by_topic(topic.id))
            .unwrap_or_default()
    }

    /// Enter a stage's main page.
    ///
    /// A selected topic from another stage is dropped.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id is not configured.
    pub fn select_stage(
        &self,
        state: &mut SessionState,
        stage_id: StageId,
    ) -> Result<(), NavigationError> {
        let stage = self
            .config
            .catalog()
            .stage(stage_id)
            .cloned()
            .ok_or(ValidationError::UnknownStage(stage_id))?;

        if state
            .selected_topic()
            .is_some_and(|topic| topic.stage_id != stage_id)
        {
            state.set_selected_topic(None);
        }
        info!(stage = %stage_id, name = %stage.name, "stage selected");
        state.set_selected_stage(Some(stage));
        state.set_current_page(Page::Main);
        state.user_progress_mut().current_stage = Some(stage_id);
        self.progress.recompute(state);
        Ok(())
    }

    /// Select a topic of the current stage and rescore.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no stage is selected, the topic is unknown,
    /// or it belongs to a different stage.
    pub fn select_topic(
        &self,
        state: &mut SessionState,
        topic_id: TopicId,
    ) -> Result<(), NavigationError> {
        let stage_id = state
            .selected_stage()
            .map(|stage| stage.id)
            .ok_or(ValidationError::NoStageSelected)?;
        let topic = self
            .config
            .catalog()
            .topic(topic_id)
            .cloned()
            .ok_or(ValidationError::UnknownTopic(topic_id))?;
        if topic.stage_id != stage_id {
            return Err(ValidationError::TopicNotInStage {
                topic: topic_id,
                stage: stage_id,
            }
            .into());
        }

        info!(topic = %topic_id, name = %topic.name, "topic selected");
        state.set_selected_topic(Some(topic));
        self.progress.recompute(state);
        Ok(())
    }

    /// Return to the stage overview. Selections and progress are kept.
    pub fn back_to_stage_selection(&self, state: &mut SessionState) {
        state.set_current_page(Page::StageSelection);
    }
}
