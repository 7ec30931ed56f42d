//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::counter::RequestCounter;
use crate::health::HealthPolicy;
use crate::load::{BusyLoop, LoadGenerator};
use crate::metrics::{MetricsSource, SystemCollector};

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the metrics source, the load generator and the request counter. The
/// counter is the only mutable value shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: Arc<dyn MetricsSource>,
    pub load: Arc<dyn LoadGenerator>,
    pub requests: Arc<RequestCounter>,
}

impl AppState {
    /// Creates the production state: host sampling and a real busy loop.
    pub fn new(config: AppConfig) -> Self {
        let collector = SystemCollector::new(&config.metrics, config.health.check_disk);
        Self::with_components(config, Arc::new(collector), Arc::new(BusyLoop))
    }

    /// Creates state with explicit metrics and load components.
    pub fn with_components(
        config: AppConfig,
        metrics: Arc<dyn MetricsSource>,
        load: Arc<dyn LoadGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            load,
            requests: Arc::new(RequestCounter::new()),
        }
    }

    pub fn health_policy(&self) -> HealthPolicy {
        HealthPolicy {
            check_disk: self.config.health.check_disk,
        }
    }
}
