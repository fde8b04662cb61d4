//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

pub use crate::config::ApiConfig;
use crate::config::StoreConfig;
use crate::storage::Resolution;
use crate::store::AvailabilityCollection;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Availability collection keyed by entity id
    pub store: Arc<dyn AvailabilityCollection>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Store behaviour (default resolution, auto-create)
    pub store_config: Arc<StoreConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AvailabilityCollection>,
        config: ApiConfig,
        store_config: StoreConfig,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            store_config: Arc::new(store_config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Resolution for entities created without an explicit one
    pub fn default_resolution(&self) -> Resolution {
        self.store_config.resolution()
    }
}
