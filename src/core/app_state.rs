//! Application State Management
//!
//! `AppState` holds the services handlers need. It is built by
//! `core::factory` and shared with axum as `Arc<AppState<S>>`.

use std::sync::Arc;

use crate::core::config::Config;
use crate::pairing::RosterService;
use crate::storage::StorageImpl;
use crate::system::metrics::Metrics;

/// Central application state holding all services and components
pub struct AppState<S: StorageImpl> {
    /// Roster operations over the configured store
    pub roster: RosterService<S>,

    /// Application configuration
    pub config: Config,

    /// Prometheus counters
    pub metrics: Metrics,
}

impl<S: StorageImpl> AppState<S> {
    /// Create a new AppState from already-initialised services
    pub fn new(roster: RosterService<S>, config: Config, metrics: Metrics) -> Self {
        Self {
            roster,
            config,
            metrics,
        }
    }

    /// Wrap in an `Arc` for use as router state
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
