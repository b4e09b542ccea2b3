use tracing::debug;

use super::state::SessionState;

/// Owner of one session's state.
///
/// The state is created on first access and replaced wholesale by
/// [`SessionStore::clear_session`], so the store is never left half-empty.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: Option<SessionState>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session state, initializing defaults on first access.
    pub fn state(&mut self) -> &mut SessionState {
        self.state.get_or_insert_with(|| {
            debug!("initializing session state");
            SessionState::default()
        })
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Drops every field and conversation log, then re-initializes defaults.
    pub fn clear_session(&mut self) -> &mut SessionState {
        debug!("clearing session state");
        self.state.insert(SessionState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ConversationKey, Page};
    use paper_core::model::{
        ChecklistId, ConversationMessage, ItemId, ItemKey, Stage, StageId,
    };

    #[test]
    fn state_is_created_lazily() {
        let mut store = SessionStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.state().current_page(), Page::StageSelection);
        assert!(store.is_initialized());
    }

    #[test]
    fn clear_session_drops_every_log_and_field() {
        let mut store = SessionStore::new();
        let state = store.state();
        state.set_current_page(Page::Main);
        state.set_selected_stage(Some(Stage::new(StageId::new(1), "开题阶段")));
        state.update_checklist_item(ItemKey::new(ChecklistId::new(1), ItemId::new(1)), true);
        state.update_total_score(42.0);
        for stage in 1..=4 {
            state.append_message(
                ConversationKey::Stage(StageId::new(stage)),
                ConversationMessage::user("hi"),
            );
        }
        state.append_message(ConversationKey::Global, ConversationMessage::user("hi"));

        let state = store.clear_session();
        assert_eq!(state.current_page(), Page::StageSelection);
        assert!(state.selected_stage().is_none());
        assert!(state.checklist_progress().is_empty());
        assert_eq!(state.user_progress().total_score, 0.0);
        assert_eq!(state.conversation_count(), 0);
        assert!(store.is_initialized());
    }
}
