//! Storage layer for the roster document
//!
//! The service only ever reads and writes the whole document, so a backend
//! needs nothing beyond `load` and `save`. Backends are selected at startup
//! by `core::factory` and shared behind an `Arc`.

use crate::core::error::Result;
use crate::types::Document;

/// Trait for whole-document storage implementations
///
/// `load` on an empty backend must create, persist and return the seed
/// document, so callers never observe "no document".
pub trait DocumentStore: Send + Sync {
    /// Read the current document, seeding it on first access
    fn load(&self) -> Result<Document>;

    /// Replace the stored document
    fn save(&self, document: &Document) -> Result<()>;
}

/// JSON file store (default backend)
pub mod json_file;

/// In-memory store
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Helper trait that combines all requirements for storage implementations
/// This cleans up generic bounds throughout the codebase
pub trait StorageImpl: DocumentStore + Send + Sync + 'static {}

/// Blanket implementation for any type that meets the requirements
impl<T> StorageImpl for T where T: DocumentStore + Send + Sync + 'static {}
