use serde::{Deserialize, Serialize};

/// Settings for the stage assistant, read from the chat configuration dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model_name: String,
    pub model_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl ChatConfig {
    pub const DEFAULT_MODEL: &'static str = "deepseek-chat";
    pub const DEFAULT_URL: &'static str = "https://api.deepseek.com/v1/chat/completions";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model_name: Self::DEFAULT_MODEL.to_owned(),
            model_url: Self::DEFAULT_URL.to_owned(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            system_prompt: String::new(),
        }
    }
}
