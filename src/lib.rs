//! Pair Rotation - weekly randomized pairings over HTTP
//!
//! Keeps a roster of participant names in a single JSON document and hands
//! out shuffled pairs that rotate once a week. An odd participant out is
//! paired with "No Partner".
#![warn(missing_docs)]

// Core foundational modules
pub mod core;
pub mod types;

// Main functional modules
pub mod api;
pub mod pairing;
pub mod storage;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, Result};
pub use pairing::{generate_pairs, is_new_week, RosterService, NO_PARTNER};
pub use types::{Document, Pair};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
