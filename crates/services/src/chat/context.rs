use paper_core::model::{ChatConfig, ConversationMessage};

use crate::session::{ConversationKey, SessionState};

/// Number of most recent history messages forwarded to the assistant.
pub const HISTORY_WINDOW: usize = 10;

/// Assembles the bounded message list for one assistant call.
///
/// Output is `[system] + last HISTORY_WINDOW messages of the log + [user]`.
/// The session is only read; recording the turn is the caller's job.
pub struct ContextBuilder<'a> {
    chat_config: &'a ChatConfig,
    history_window: usize,
}

impl<'a> ContextBuilder<'a> {
    #[must_use]
    pub fn new(chat_config: &'a ChatConfig) -> Self {
        Self {
            chat_config,
            history_window: HISTORY_WINDOW,
        }
    }

    #[must_use]
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// System prompt from configuration, plus the active stage/topic lines.
    #[must_use]
    pub fn system_prompt(&self, state: &SessionState) -> String {
        let mut prompt = self.chat_config.system_prompt.clone();
        let stage = state.selected_stage();
        let topic = state.selected_topic();
        if stage.is_some() || topic.is_some() {
            let stage_name = stage.map_or("", |stage| stage.name.as_str());
            prompt.push_str("\n\n当前阶段：");
            prompt.push_str(stage_name);
            if let Some(topic) = topic {
                prompt.push_str("\n当前课题：");
                prompt.push_str(&topic.name);
            }
        }
        prompt
    }

    #[must_use]
    pub fn build(
        &self,
        state: &SessionState,
        key: ConversationKey,
        user_message: &str,
    ) -> Vec<ConversationMessage> {
        let history = state.chat_history(key);
        let recent = &history[history.len().saturating_sub(self.history_window)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ConversationMessage::system(self.system_prompt(state)));
        messages.extend(recent.iter().cloned());
        messages.push(ConversationMessage::user(user_message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MIDTERM, PROPOSAL, SYSTEM_PROMPT, TOPIC_SELECTION, repo};
    use paper_core::model::Role;

    fn state_on_stage(stage: paper_core::model::StageId) -> SessionState {
        let config = repo();
        let mut state = SessionState::new();
        state.set_selected_stage(config.catalog().stage(stage).cloned());
        state
    }

    fn config() -> ChatConfig {
        ChatConfig {
            system_prompt: SYSTEM_PROMPT.to_owned(),
            ..ChatConfig::default()
        }
    }

    #[test]
    fn stage_without_topic_omits_topic_line() {
        let chat = config();
        let state = state_on_stage(MIDTERM);
        let messages = ContextBuilder::new(&chat).build(&state, ConversationKey::Stage(MIDTERM), "hi");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, format!("{SYSTEM_PROMPT}\n\n当前阶段：中期阶段"));
        assert!(!messages[0].content.contains("当前课题"));
        assert_eq!(messages[1], ConversationMessage::user("hi"));
    }

    #[test]
    fn stage_and_topic_are_both_named() {
        let chat = config();
        let mut state = state_on_stage(PROPOSAL);
        state.set_selected_topic(repo().catalog().topic(TOPIC_SELECTION).cloned());

        let prompt = ContextBuilder::new(&chat).system_prompt(&state);
        assert_eq!(prompt, format!("{SYSTEM_PROMPT}\n\n当前阶段：开题阶段\n当前课题：选题"));
    }

    #[test]
    fn no_selection_keeps_plain_prompt() {
        let chat = config();
        let prompt = ContextBuilder::new(&chat).system_prompt(&SessionState::new());
        assert_eq!(prompt, SYSTEM_PROMPT);
    }

    #[test]
    fn keeps_only_the_latest_messages_in_order() {
        let chat = config();
        let mut state = state_on_stage(PROPOSAL);
        let key = ConversationKey::Stage(PROPOSAL);
        for i in 0..15 {
            state.append_message(key, ConversationMessage::user(format!("m{i}")));
        }

        let messages = ContextBuilder::new(&chat).build(&state, key, "new");

        assert_eq!(messages.len(), HISTORY_WINDOW + 2);
        let kept: Vec<&str> = messages[1..=HISTORY_WINDOW]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        let expected: Vec<String> = (5..15).map(|i| format!("m{i}")).collect();
        assert_eq!(kept, expected);
        assert_eq!(messages.last().map(|m| m.content.as_str()), Some("new"));
        assert_eq!(state.chat_history(key).len(), 15);
    }

    #[test]
    fn other_stage_history_never_leaks() {
        let chat = config();
        let mut state = state_on_stage(MIDTERM);
        state.append_message(
            ConversationKey::Stage(PROPOSAL),
            ConversationMessage::user("secret from proposal"),
        );

        let messages =
            ContextBuilder::new(&chat).build(&state, ConversationKey::Stage(MIDTERM), "hi");
        assert!(messages.iter().all(|m| m.content != "secret from proposal"));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn custom_window_is_respected() {
        let chat = config();
        let mut state = SessionState::new();
        for i in 0..4 {
            state.append_message(ConversationKey::Global, ConversationMessage::user(format!("m{i}")));
        }
        let messages = ContextBuilder::new(&chat)
            .with_history_window(2)
            .build(&state, ConversationKey::Global, "x");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "m2");
    }
}
