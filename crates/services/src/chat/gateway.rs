use std::env;
use std::time::Duration;

use async_trait::async_trait;
use paper_core::model::{ChatConfig, ConversationMessage};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GatewayError;

pub const API_KEY_ENV: &str = "PAPER_AI_API_KEY";
pub const BASE_URL_ENV: &str = "PAPER_AI_BASE_URL";
pub const MODEL_ENV: &str = "PAPER_AI_MODEL";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat-completion endpoint seen by the services.
///
/// No retries happen behind this trait; callers decide with
/// [`GatewayError::is_retryable`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether a credential is present. Checked before any session mutation.
    fn is_configured(&self) -> bool;

    /// Send one ordered message list and return the reply text.
    async fn complete(&self, messages: &[ConversationMessage]) -> Result<String, GatewayError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl GatewayConfig {
    #[must_use]
    pub fn from_chat_config(chat: &ChatConfig) -> Self {
        Self {
            endpoint: chat.model_url.clone(),
            api_key: None,
            model: chat.model_name.clone(),
            temperature: chat.temperature,
            max_tokens: chat.max_tokens,
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    /// Apply `PAPER_AI_*` overrides. The base URL gets `/chat/completions`
    /// appended; `chat_config.json` carries the full endpoint instead.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_key) = env::var(API_KEY_ENV) {
            self = self.with_api_key(api_key);
        }
        if let Ok(base_url) = env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            self.endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        }
        if let Ok(model) = env::var(MODEL_ENV)
            && !model.trim().is_empty()
        {
            self.model = model;
        }
        self
    }
}

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    config: GatewayConfig,
}

impl HttpCompletionClient {
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GatewayError::Config(err.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, messages: &[ConversationMessage]) -> Result<String, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Config(format!("{API_KEY_ENV} is not set")))?;

        let payload = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|message| ChatMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            messages = messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "completion endpoint rejected the credential");
            return Err(GatewayError::Config(format!(
                "credential rejected with HTTP status {status}"
            )));
        }
        if !status.is_success() {
            warn!(%status, "completion endpoint returned an error status");
            return Err(GatewayError::Transport(format!("HTTP status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        parse_reply(&body)
    }
}

fn map_send_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        GatewayError::Config(err.to_string())
    } else if err.is_timeout() || err.is_connect() || err.is_request() {
        GatewayError::Transport(err.to_string())
    } else {
        GatewayError::Unknown(err.to_string())
    }
}

/// Extract `choices[0].message.content` from a response body.
fn parse_reply(body: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|err| GatewayError::Format(err.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::Format("missing choices[0].message.content".into()))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
