use std::sync::Arc;

use crate::config::Config;
use crate::handlers::ContentSettings;
use crate::observability::Metrics;

/// Shared state for the demo server. The content registry is built during
/// startup and read-only from here on; request handlers share it through
/// the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<ContentSettings>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, settings: ContentSettings) -> Self {
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
