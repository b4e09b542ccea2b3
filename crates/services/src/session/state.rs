use std::collections::HashMap;

use paper_core::model::{
    ChecklistProgress, ConversationMessage, ItemKey, Stage, StageId, Topic, UserProgress,
};

/// Page the interactive front-end is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    StageSelection,
    Main,
}

/// Identifies one conversation log. Each stage owns its own log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Global,
    Stage(StageId),
}

impl From<Option<StageId>> for ConversationKey {
    fn from(stage_id: Option<StageId>) -> Self {
        stage_id.map_or(ConversationKey::Global, ConversationKey::Stage)
    }
}

/// All mutable state of one interactive session.
///
/// Owned by a single session handle and passed by reference to the services;
/// it is not meant to be shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current_page: Page,
    selected_stage: Option<Stage>,
    selected_topic: Option<Topic>,
    checklist_progress: ChecklistProgress,
    user_progress: UserProgress,
    conversations: HashMap<ConversationKey, Vec<ConversationMessage>>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn set_current_page(&mut self, page: Page) {
        self.current_page = page;
    }

    #[must_use]
    pub fn selected_stage(&self) -> Option<&Stage> {
        self.selected_stage.as_ref()
    }

    pub fn set_selected_stage(&mut self, stage: Option<Stage>) {
        self.selected_stage = stage;
    }

    #[must_use]
    pub fn selected_topic(&self) -> Option<&Topic> {
        self.selected_topic.as_ref()
    }

    pub fn set_selected_topic(&mut self, topic: Option<Topic>) {
        self.selected_topic = topic;
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn checklist_progress(&self) -> &ChecklistProgress {
        &self.checklist_progress
    }

    pub fn checklist_progress_mut(&mut self) -> &mut ChecklistProgress {
        &mut self.checklist_progress
    }

    pub fn set_checklist_progress(&mut self, progress: ChecklistProgress) {
        self.checklist_progress = progress;
    }

    pub fn update_checklist_item(&mut self, key: ItemKey, completed: bool) {
        self.checklist_progress.set(key, completed);
    }

    #[must_use]
    pub fn user_progress(&self) -> &UserProgress {
        &self.user_progress
    }

    pub fn user_progress_mut(&mut self) -> &mut UserProgress {
        &mut self.user_progress
    }

    pub fn set_user_progress(&mut self, progress: UserProgress) {
        self.user_progress = progress;
    }

    pub fn update_stage_progress(&mut self, stage_id: StageId, percentage: f64) {
        self.user_progress.stage_progress.insert(stage_id, percentage);
    }

    pub fn update_total_score(&mut self, score: f64) {
        self.user_progress.total_score = score;
    }

    //
    // ─── CONVERSATIONS ─────────────────────────────────────────────────────────
    //

    /// Messages of one log in chronological order; empty if never written.
    #[must_use]
    pub fn chat_history(&self, key: ConversationKey) -> &[ConversationMessage] {
        self.conversations.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn append_message(&mut self, key: ConversationKey, message: ConversationMessage) {
        self.conversations.entry(key).or_default().push(message);
    }

    pub fn replace_history(&mut self, key: ConversationKey, history: Vec<ConversationMessage>) {
        self.conversations.insert(key, history);
    }

    pub fn clear_history(&mut self, key: ConversationKey) {
        self.conversations.remove(&key);
    }

    /// Number of logs that currently hold messages.
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.conversations.values().filter(|log| !log.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_logs_are_isolated() {
        let mut state = SessionState::new();
        let a = ConversationKey::Stage(StageId::new(1));
        let b = ConversationKey::Stage(StageId::new(2));

        state.append_message(a, ConversationMessage::user("hello from A"));

        assert_eq!(state.chat_history(a).len(), 1);
        assert!(state.chat_history(b).is_empty());
        assert!(state.chat_history(ConversationKey::Global).is_empty());
    }

    #[test]
    fn replace_and_clear_affect_one_log() {
        let mut state = SessionState::new();
        let a = ConversationKey::Stage(StageId::new(1));
        state.append_message(a, ConversationMessage::user("x"));
        state.append_message(ConversationKey::Global, ConversationMessage::user("y"));

        state.replace_history(a, vec![ConversationMessage::assistant("z")]);
        assert_eq!(state.chat_history(a)[0].content, "z");

        state.clear_history(a);
        assert!(state.chat_history(a).is_empty());
        assert_eq!(state.chat_history(ConversationKey::Global).len(), 1);
        assert_eq!(state.conversation_count(), 1);
    }

    #[test]
    fn optional_stage_maps_to_key() {
        assert_eq!(ConversationKey::from(None), ConversationKey::Global);
        assert_eq!(
            ConversationKey::from(Some(StageId::new(3))),
            ConversationKey::Stage(StageId::new(3))
        );
    }
}
