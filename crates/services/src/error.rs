//! Shared error types for the services crate.

use thiserror::Error;

use paper_core::model::{StageId, TopicId};
use storage::StorageError;

/// Input rejected before any state mutation or network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("unknown stage {0}")]
    UnknownStage(StageId),
    #[error("unknown topic {0}")]
    UnknownTopic(TopicId),
    #[error("topic {topic} does not belong to stage {stage}")]
    TopicNotInStage { topic: TopicId, stage: StageId },
    #[error("no stage selected")]
    NoStageSelected,
}

/// Failures of the language-model completion endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("assistant is not configured: {0}")]
    Config(String),
    #[error("assistant request failed: {0}")]
    Transport(String),
    #[error("assistant returned an unexpected response: {0}")]
    Format(String),
    #[error("assistant call failed: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Only network-level failures are worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

/// Errors emitted by `ChatService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors emitted by `Navigator`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors emitted by `ResearchEvaluator`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(GatewayError::Transport("timeout".into()).is_retryable());
        assert!(!GatewayError::Config("no key".into()).is_retryable());
        assert!(!GatewayError::Format("no choices".into()).is_retryable());
        assert!(!GatewayError::Unknown("?".into()).is_retryable());
    }
}
