use std::sync::Arc;

use paper_core::model::{ConversationMessage, StageId};
use storage::ConfigRepository;
use tracing::{info, warn};

use super::context::ContextBuilder;
use super::gateway::{API_KEY_ENV, CompletionClient};
use crate::error::{ChatError, GatewayError, ValidationError};
use crate::session::{ConversationKey, SessionState};

/// Runs one conversation turn per call against a stage-scoped log.
#[derive(Clone)]
pub struct ChatService {
    config: Arc<dyn ConfigRepository>,
    client: Arc<dyn CompletionClient>,
}

impl ChatService {
    #[must_use]
    pub fn new(config: Arc<dyn ConfigRepository>, client: Arc<dyn CompletionClient>) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client.is_configured()
    }

    /// Send `text` in the conversation of `stage` (or the global one).
    ///
    /// The user turn is recorded even when the gateway fails; the assistant
    /// turn only on success.
    ///
    /// # Errors
    ///
    /// `ChatError::Validation` for blank text or an unknown stage and
    /// `ChatError::Gateway` for a missing credential or failed call. Only the
    /// gateway call failure happens after the user turn is stored.
    pub async fn send_message(
        &self,
        state: &mut SessionState,
        text: &str,
        stage: Option<StageId>,
    ) -> Result<String, ChatError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if let Some(stage_id) = stage
            && self.config.catalog().stage(stage_id).is_none()
        {
            return Err(ValidationError::UnknownStage(stage_id).into());
        }
        if !self.client.is_configured() {
            return Err(GatewayError::Config(format!("{API_KEY_ENV} is not set")).into());
        }

        let key = ConversationKey::from(stage);
        let messages = ContextBuilder::new(self.config.chat_config()).build(state, key, text);
        state.append_message(key, ConversationMessage::user(text));

        match self.client.complete(&messages).await {
            Ok(reply) => {
                info!(?key, context = messages.len(), "assistant replied");
                state.append_message(key, ConversationMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                warn!(?key, error = %err, retryable = err.is_retryable(), "assistant call failed");
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn history<'s>(
        &self,
        state: &'s SessionState,
        stage: Option<StageId>,
    ) -> &'s [ConversationMessage] {
        state.chat_history(stage.into())
    }

    /// Empty one conversation log; other stages keep theirs.
    pub fn clear_history(&self, state: &mut SessionState, stage: Option<StageId>) {
        let key = ConversationKey::from(stage);
        info!(?key, "clearing conversation");
        state.clear_history(key);
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedClient;
    use super::*;
    use crate::test_support::{MIDTERM, PROPOSAL, SYSTEM_PROMPT, repo};
    use paper_core::model::Role;

    fn service(client: &Arc<ScriptedClient>) -> ChatService {
        ChatService::new(repo(), Arc::clone(client) as Arc<dyn CompletionClient>)
    }

    #[tokio::test]
    async fn successful_turn_appends_user_then_assistant() {
        let client = Arc::new(ScriptedClient::replying(vec![Ok("先做文献综述".into())]));
        let chat = service(&client);
        let mut state = SessionState::new();

        let reply = chat
            .send_message(&mut state, "  怎么选题？\n", Some(PROPOSAL))
            .await
            .unwrap();

        assert_eq!(reply, "先做文献综述");
        let history = chat.history(&state, Some(PROPOSAL));
        assert_eq!(
            history,
            [
                ConversationMessage::user("  怎么选题？\n"),
                ConversationMessage::assistant("先做文献综述"),
            ]
        );

        let request = client.last_request();
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, Role::System);
        assert!(request[0].content.starts_with(SYSTEM_PROMPT));
        assert_eq!(request[1], ConversationMessage::user("  怎么选题？\n"));
    }

    #[tokio::test]
    async fn context_does_not_repeat_the_new_user_turn() {
        let client = Arc::new(ScriptedClient::replying(vec![
            Ok("a1".into()),
            Ok("a2".into()),
        ]));
        let chat = service(&client);
        let mut state = SessionState::new();

        chat.send_message(&mut state, "q1", Some(PROPOSAL)).await.unwrap();
        chat.send_message(&mut state, "q2", Some(PROPOSAL)).await.unwrap();

        let contents: Vec<String> = client
            .last_request()
            .into_iter()
            .skip(1)
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["q1", "a1", "q2"]);
        assert_eq!(chat.history(&state, Some(PROPOSAL)).len(), 4);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_only_the_user_turn() {
        let client = Arc::new(ScriptedClient::replying(vec![Err(
            GatewayError::Transport("timeout".into()),
        )]));
        let chat = service(&client);
        let mut state = SessionState::new();

        let err = chat
            .send_message(&mut state, "hello", Some(MIDTERM))
            .await
            .unwrap_err();

        assert_eq!(err, ChatError::Gateway(GatewayError::Transport("timeout".into())));
        assert_eq!(
            chat.history(&state, Some(MIDTERM)),
            [ConversationMessage::user("hello")]
        );
    }

    #[tokio::test]
    async fn rejected_input_leaves_state_untouched() {
        let client = Arc::new(ScriptedClient::replying(Vec::new()));
        let chat = service(&client);
        let mut state = SessionState::new();

        let err = chat.send_message(&mut state, "   ", None).await.unwrap_err();
        assert_eq!(err, ChatError::Validation(ValidationError::EmptyMessage));

        let err = chat
            .send_message(&mut state, "hi", Some(StageId::new(99)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ChatError::Validation(ValidationError::UnknownStage(StageId::new(99)))
        );

        assert_eq!(state.conversation_count(), 0);
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn missing_credential_is_reported_before_mutation() {
        let client = Arc::new(ScriptedClient::unconfigured());
        let chat = service(&client);
        let mut state = SessionState::new();

        assert!(!chat.is_available());
        let err = chat.send_message(&mut state, "hi", None).await.unwrap_err();
        assert!(matches!(err, ChatError::Gateway(GatewayError::Config(_))));
        assert_eq!(state.conversation_count(), 0);
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn stages_keep_separate_logs() {
        let client = Arc::new(ScriptedClient::replying(vec![
            Ok("p".into()),
            Ok("m".into()),
        ]));
        let chat = service(&client);
        let mut state = SessionState::new();

        chat.send_message(&mut state, "proposal question", Some(PROPOSAL))
            .await
            .unwrap();
        chat.send_message(&mut state, "midterm question", Some(MIDTERM))
            .await
            .unwrap();

        let request = client.last_request();
        assert!(request.iter().all(|m| m.content != "proposal question"));
        assert_eq!(chat.history(&state, Some(PROPOSAL)).len(), 2);
        assert_eq!(chat.history(&state, Some(MIDTERM)).len(), 2);

        chat.clear_history(&mut state, Some(PROPOSAL));
        assert!(chat.history(&state, Some(PROPOSAL)).is_empty());
        assert_eq!(chat.history(&state, Some(MIDTERM)).len(), 2);
    }

    #[tokio::test]
    async fn http_failures_leave_no_assistant_turn() {
        use crate::chat::{GatewayConfig, HttpCompletionClient};
        use crate::test_support::serve_once;
        use paper_core::model::ChatConfig;

        let cases = [
            ("500 Internal Server Error", "{}"),
            ("200 OK", r#"{"choices":[]}"#),
        ];
        for (status, body) in cases {
            let config = GatewayConfig {
                endpoint: serve_once(status, body).await,
                ..GatewayConfig::from_chat_config(&ChatConfig::default())
            }
            .with_api_key("sk-test");
            let client = HttpCompletionClient::new(config).unwrap();
            let chat = ChatService::new(repo(), Arc::new(client));
            let mut state = SessionState::new();

            let err = chat
                .send_message(&mut state, "hello", Some(PROPOSAL))
                .await
                .unwrap_err();

            match status {
                "200 OK" => assert!(
                    matches!(err, ChatError::Gateway(GatewayError::Format(_))),
                    "{err:?}"
                ),
                _ => assert!(
                    matches!(err, ChatError::Gateway(GatewayError::Transport(_))),
                    "{err:?}"
                ),
            }
            assert_eq!(
                chat.history(&state, Some(PROPOSAL)),
                [ConversationMessage::user("hello")]
            );
            assert_eq!(state.conversation_count(), 1);
        }
    }
}
