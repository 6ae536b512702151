//! In-memory document store
//!
//! Holds the document for the life of the process. Used for tests and for
//! `storage_type = "memory"` deployments that don't need persistence.

use parking_lot::RwLock;

use crate::core::error::Result;
use crate::storage::DocumentStore;
use crate::types::Document;

/// Document store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<Document>>,
    seed_users: Vec<String>,
}

impl MemoryStore {
    /// Empty store that seeds itself with `seed_users` on first load
    pub fn new(seed_users: Vec<String>) -> Self {
        Self {
            document: RwLock::new(None),
            seed_users,
        }
    }

    /// Store that already holds `document`
    pub fn with_document(document: Document) -> Self {
        Self {
            document: RwLock::new(Some(document)),
            seed_users: Vec::new(),
        }
    }

    /// Current document without seeding, for inspection
    pub fn snapshot(&self) -> Option<Document> {
        self.document.read().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document> {
        if let Some(document) = self.document.read().as_ref() {
            return Ok(document.clone());
        }

        let mut slot = self.document.write();
        let document = slot
            .get_or_insert_with(|| Document::seeded(self.seed_users.iter().cloned()))
            .clone();
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<()> {
        *self.document.write() = Some(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_lazily() {
        let store = MemoryStore::new(vec!["Alice".to_string()]);
        assert!(store.snapshot().is_none());

        let doc = store.load().unwrap();
        assert_eq!(doc.users, vec!["Alice"]);
        assert_eq!(store.snapshot(), Some(doc));
    }

    #[test]
    fn test_save_replaces_document() {
        let store = MemoryStore::with_document(Document::seeded(["Alice"]));
        let mut doc = store.load().unwrap();
        doc.users.push("Bob".to_string());
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap().users, vec!["Alice", "Bob"]);
    }
}
