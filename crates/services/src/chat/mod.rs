//! Stage-scoped assistant conversations.

mod context;
mod gateway;
mod service;

#[cfg(test)]
pub(crate) use service::fakes;

pub use context::{ContextBuilder, HISTORY_WINDOW};
pub use gateway::{
    API_KEY_ENV, BASE_URL_ENV, CompletionClient, GatewayConfig, HttpCompletionClient, MODEL_ENV,
    REQUEST_TIMEOUT,
};
pub use service::ChatService;
