//! Application Factory
//!
//! Builds the `AppState` for the storage backend named in the configuration.
//! Handlers are generic over the store, so the backend choice is resolved
//! once here into a concrete type.

use std::net::SocketAddr;
use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use crate::core::app_state::AppState;
use crate::core::config::{Config, StorageType};
use crate::core::error::Result;
use crate::pairing::{RosterService, SharedClock};
use crate::storage::{JsonFileStore, MemoryStore, StorageImpl};
use crate::system::metrics::Metrics;

/// AppState specialised to the configured storage backend
pub enum ConfiguredAppState {
    /// Backed by a JSON file on disk
    JsonFile(Arc<AppState<JsonFileStore>>),
    /// Backed by process memory
    Memory(Arc<AppState<MemoryStore>>),
}

impl ConfiguredAppState {
    /// Get the HTTP address from config
    pub fn http_addr(&self) -> SocketAddr {
        match self {
            ConfiguredAppState::JsonFile(app_state) => app_state.config.server.http_addr,
            ConfiguredAppState::Memory(app_state) => app_state.config.server.http_addr,
        }
    }

    /// Build the router for whichever backend is configured
    pub fn router(&self) -> axum::Router {
        match self {
            ConfiguredAppState::JsonFile(app_state) => crate::api::create_app(app_state.clone()),
            ConfiguredAppState::Memory(app_state) => crate::api::create_app(app_state.clone()),
        }
    }
}

/// Assemble an AppState over `store` with the given clock
pub fn build_app_state<S: StorageImpl>(
    store: S,
    clock: SharedClock,
    config: Config,
) -> Result<AppState<S>> {
    let roster = RosterService::new(Arc::new(store), clock);
    let metrics = Metrics::new()?;
    Ok(AppState::new(roster, config, metrics))
}

/// Create AppState based on configuration, using the system clock
pub fn create_app_state(config: Config) -> Result<ConfiguredAppState> {
    info!(storage_type = ?config.storage.storage_type, "Creating AppState");

    let clock: SharedClock = Arc::new(DefaultClock);
    let seed_users = config.storage.seed_users.clone();

    match config.storage.storage_type {
        StorageType::JsonFile => {
            let store = JsonFileStore::new(config.storage.data_file.clone(), seed_users);
            info!(path = %store.path().display(), "Initialised JSON file store");
            let app_state = build_app_state(store, clock, config)?;
            Ok(ConfiguredAppState::JsonFile(app_state.shared()))
        }
        StorageType::Memory => {
            let store = MemoryStore::new(seed_users);
            info!("Initialised in-memory store");
            let app_state = build_app_state(store, clock, config)?;
            Ok(ConfiguredAppState::Memory(app_state.shared()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_selected() {
        let mut config = Config::default();
        config.storage.storage_type = StorageType::Memory;
        config.server.http_addr = "127.0.0.1:4100".parse().unwrap();

        let state = create_app_state(config).unwrap();
        assert!(matches!(state, ConfiguredAppState::Memory(_)));
        assert_eq!(state.http_addr().port(), 4100);
    }

    #[test]
    fn test_json_backend_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_file = dir.path().join("data.json");

        let state = create_app_state(config).unwrap();
        match state {
            ConfiguredAppState::JsonFile(app_state) => {
                assert_eq!(app_state.roster.store().path(), dir.path().join("data.json"));
            }
            ConfiguredAppState::Memory(_) => panic!("expected JSON file backend"),
        }
    }
}
