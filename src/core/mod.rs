//! Core application logic and configuration
//!
//! Configuration, errors, logging setup and the application state shared by
//! the HTTP layer.

/// Application configuration
pub mod config;

/// Error types
pub mod error;

/// Tracing subscriber setup
pub mod logging;

/// Application state management
pub mod app_state;

/// Factory pattern for app creation
pub mod factory;

// Re-export commonly used items
pub use app_state::AppState;
pub use config::Config;
pub use error::{Error, Result, StorageError};
pub use factory::{build_app_state, create_app_state, ConfiguredAppState};
