use std::sync::Arc;

use paper_core::model::{
    ChecklistId, ChecklistProgress, ItemId, ItemKey, ProgressSnapshot, StageId, TopicId, UserProgress,
};
use paper_core::{Clock, TopicStats, score_topic};
use storage::ConfigRepository;
use tracing::debug;

use crate::session::SessionState;

/// Which checklist entries a reset removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Every entry plus the aggregated progress.
    All,
    /// Entries of every topic belonging to the stage.
    Stage(StageId),
    /// Entries of one topic.
    Topic(TopicId),
}

/// Scores checklist progress and keeps the session's aggregates in sync.
///
/// The visible score is scoped to the selected topic: switching topics
/// recomputes it from that topic's items only, while the completion flags of
/// other topics are kept.
#[derive(Clone)]
pub struct ProgressTracker {
    config: Arc<dyn ConfigRepository>,
    clock: Clock,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigRepository>, clock: Clock) -> Self {
        Self { config, clock }
    }

    /// Statistics for the selected topic, without touching the session.
    #[must_use]
    pub fn current_stats(&self, state: &SessionState) -> TopicStats {
        state.selected_topic().map_or_else(TopicStats::default, |topic| {
            self.topic_stats(state, topic.id)
        })
    }

    /// Statistics for any topic; unknown topics score zero.
    #[must_use]
    pub fn topic_stats(&self, state: &SessionState, topic_id: TopicId) -> TopicStats {
        score_topic(
            self.config.checklists_by_topic(topic_id),
            state.checklist_progress(),
        )
    }

    /// Recompute the selected stage's percentage and the session score.
    ///
    /// Does nothing unless both a stage and a topic are selected, so stored
    /// stage percentages survive leaving and re-entering a stage. Returns the
    /// stats written.
    pub fn recompute(&self, state: &mut SessionState) -> Option<TopicStats> {
        let stage_id = state.selected_stage()?.id;
        let topic_id = state.selected_topic()?.id;
        let stats = self.current_stats(state);

        state.update_stage_progress(stage_id, stats.completion_percentage);
        state.update_total_score(stats.total_score);
        track_completed_topic(state.user_progress_mut(), topic_id, stats.is_complete());

        debug!(
            stage = %stage_id,
            completed = stats.completed_items,
            total = stats.total_items,
            score = stats.total_score,
            "progress recomputed"
        );
        Some(stats)
    }

    /// Flip one item's completion flag and recompute. Returns the new flag.
    pub fn toggle(
        &self,
        state: &mut SessionState,
        checklist_id: ChecklistId,
        item_id: ItemId,
    ) -> bool {
        let completed = state
            .checklist_progress_mut()
            .toggle(ItemKey::new(checklist_id, item_id));
        self.recompute(state);
        completed
    }

    pub fn reset(&self, state: &mut SessionState, scope: ResetScope) {
        let catalog = self.config.catalog();
        match scope {
            ResetScope::All => {
                state.set_checklist_progress(ChecklistProgress::new());
                state.set_user_progress(UserProgress::default());
                debug!("progress reset");
                return;
            }
            ResetScope::Stage(stage_id) => {
                state.checklist_progress_mut().retain(|key, _| {
                    catalog.stage_of_checklist(key.checklist_id) != Some(stage_id)
                });
                state
                    .user_progress_mut()
                    .completed_topics
                    .retain(|topic_id| {
                        catalog.topic(*topic_id).map(|topic| topic.stage_id) != Some(stage_id)
                    });
                state.user_progress_mut().stage_progress.remove(&stage_id);
            }
            ResetScope::Topic(topic_id) => {
                state.checklist_progress_mut().retain(|key, _| {
                    catalog.topic_of_checklist(key.checklist_id) != Some(topic_id)
                });
                state
                    .user_progress_mut()
                    .completed_topics
                    .retain(|done| *done != topic_id);
            }
        }
        debug!(?scope, "progress reset");
        self.recompute(state);
    }

    /// Stored percentage for a stage, 0 if it was never scored.
    #[must_use]
    pub fn stage_progress(&self, state: &SessionState, stage_id: StageId) -> f64 {
        state
            .user_progress()
            .stage_progress
            .get(&stage_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// Mean of the stored stage percentages, 0 when none were scored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn overall_progress(&self, state: &SessionState) -> f64 {
        let stage_progress = &state.user_progress().stage_progress;
        if stage_progress.is_empty() {
            return 0.0;
        }
        stage_progress.values().sum::<f64>() / stage_progress.len() as f64
    }

    /// Number of stages with some progress.
    #[must_use]
    pub fn active_stage_count(&self, state: &SessionState) -> usize {
        state
            .user_progress()
            .stage_progress
            .values()
            .filter(|pct| **pct > 0.0)
            .count()
    }

    #[must_use]
    pub fn export_progress(&self, state: &SessionState) -> ProgressSnapshot {
        ProgressSnapshot {
            checklist_progress: state.checklist_progress().clone(),
            user_progress: state.user_progress().clone(),
            timestamp: Some(self.clock.now()),
        }
    }

    /// Restore both progress maps verbatim, then recompute.
    pub fn import_progress(&self, state: &mut SessionState, snapshot: ProgressSnapshot) {
        state.set_checklist_progress(snapshot.checklist_progress);
        state.set_user_progress(snapshot.user_progress);
        self.recompute(state);
    }
}

fn track_completed_topic(progress: &mut UserProgress, topic_id: TopicId, complete: bool) {
    let tracked = progress.completed_topics.contains(&topic_id);
    if complete && !tracked {
        progress.completed_topics.push(topic_id);
    } else if !complete && tracked {
        progress.completed_topics.retain(|done| *done != topic_id);
    }
}
