//! Type definitions for the pairing service

/// Persisted document and pair types
pub mod document;

pub use document::{Document, Pair};
