//! Pairing engine and the roster service built on it

/// Pair generation and rotation predicate
pub mod engine;

/// Per-endpoint orchestration over a document store
pub mod service;

pub use engine::{generate_pairs, generate_pairs_with, is_new_week, NO_PARTNER};
pub use service::{PairsSnapshot, RosterService, SharedClock};
