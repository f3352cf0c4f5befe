//! Application state
//!
//! Holds the scheduler and the configuration it was built from.

use std::sync::Arc;

use matchpool_common::AppConfig;
use matchpool_service::RoundScheduler;

/// State shared by the tick loop and one-off commands
#[derive(Clone)]
pub struct AppState {
    scheduler: Arc<RoundScheduler>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(scheduler: RoundScheduler, config: AppConfig) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            config: Arc::new(config),
        }
    }

    pub fn scheduler(&self) -> &RoundScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("scheduler", &self.scheduler.options())
            .field("config", &"AppConfig")
            .finish()
    }
}
