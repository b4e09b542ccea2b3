#![forbid(unsafe_code)]

pub mod app_services;
pub mod chat;
pub mod error;
pub mod evaluation_service;
pub mod navigation_service;
pub mod progress_service;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use paper_core::Clock;

pub use app_services::AppServices;
pub use chat::{ChatService, CompletionClient, ContextBuilder, GatewayConfig, HttpCompletionClient};
pub use error::{
    AppServicesError, ChatError, EvaluationError, GatewayError, NavigationError, ValidationError,
};
pub use evaluation_service::{Evaluation, ResearchEvaluator};
pub use navigation_service::Navigator;
pub use progress_service::{ProgressTracker, ResetScope};
pub use session::{ConversationKey, Page, SessionState, SessionStore};
