use std::path::PathBuf;
use std::sync::Arc;

use storage::{ConfigRepository, Storage};
use tracing::info;

use crate::Clock;
use crate::chat::{ChatService, CompletionClient, GatewayConfig, HttpCompletionClient};
use crate::error::AppServicesError;
use crate::evaluation_service::ResearchEvaluator;
use crate::navigation_service::Navigator;
use crate::progress_service::ProgressTracker;

/// Assembles app-facing services over one shared configuration store.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<dyn ConfigRepository>,
    progress: Arc<ProgressTracker>,
    navigator: Arc<Navigator>,
    chat: Arc<ChatService>,
    evaluator: Arc<ResearchEvaluator>,
}

impl AppServices {
    /// Build services from an assets directory and the `PAPER_AI_*` environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the datasets cannot be read or are
    /// inconsistent, or the HTTP client cannot be built.
    pub fn from_assets(dir: impl Into<PathBuf>, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::json_assets(dir)?;
        let gateway =
            GatewayConfig::from_chat_config(storage.config.chat_config()).with_env_overrides();
        info!(
            endpoint = %gateway.endpoint,
            model = %gateway.model,
            configured = gateway.api_key.is_some(),
            "assistant gateway ready"
        );
        let client = Arc::new(HttpCompletionClient::new(gateway)?);
        Ok(Self::new(&storage, client, clock))
    }

    #[must_use]
    pub fn new(storage: &Storage, client: Arc<dyn CompletionClient>, clock: Clock) -> Self {
        let config = Arc::clone(&storage.config);
        let progress = ProgressTracker::new(Arc::clone(&config), clock);
        let navigator = Navigator::new(Arc::clone(&config), progress.clone());
        let chat = ChatService::new(Arc::clone(&config), Arc::clone(&client));
        let evaluator = ResearchEvaluator::new(Arc::clone(&config), client);

        Self {
            config,
            progress: Arc::new(progress),
            navigator: Arc::new(navigator),
            chat: Arc::new(chat),
            evaluator: Arc::new(evaluator),
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<dyn ConfigRepository> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn navigator(&self) -> Arc<Navigator> {
        Arc::clone(&self.navigator)
    }

    #[must_use]
    pub fn chat(&self) -> Arc<ChatService> {
        Arc::clone(&self.chat)
    }

    #[must_use]
    pub fn evaluator(&self) -> Arc<ResearchEvaluator> {
        Arc::clone(&self.evaluator)
    }
}
