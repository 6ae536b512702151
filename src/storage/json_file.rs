//! Whole-file JSON storage
//!
//! The document lives in a single pretty-printed JSON file. Writes go to a
//! sibling temp file which is then renamed over the target, so a crash
//! mid-write leaves the previous document intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{Result, StorageError};
use crate::storage::DocumentStore;
use crate::types::Document;

/// Document store backed by one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    seed_users: Vec<String>,
}

impl JsonFileStore {
    /// Create a store for `path`, seeding new files with `seed_users`
    pub fn new(path: impl Into<PathBuf>, seed_users: Vec<String>) -> Self {
        Self {
            path: path.into(),
            seed_users,
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "data.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read(&self) -> Result<Option<Document>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e).into()),
        };

        let document: Document =
            serde_json::from_str(&contents).map_err(StorageError::Serialization)?;
        document.validate()?;
        Ok(Some(document))
    }

    fn write(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let body = serde_json::to_string_pretty(document).map_err(StorageError::Serialization)?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp).map_err(StorageError::Io)?;
            file.write_all(body.as_bytes()).map_err(StorageError::Io)?;
            file.sync_all().map_err(StorageError::Io)?;
        }
        fs::rename(&temp, &self.path).map_err(StorageError::Io)?;

        debug!(path = %self.path.display(), bytes = body.len(), "Document written");
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Document> {
        if let Some(document) = self.read()? {
            return Ok(document);
        }

        let seed = Document::seeded(self.seed_users.iter().cloned());
        self.write(&seed)?;
        info!(
            path = %self.path.display(),
            users = seed.users.len(),
            "Created seed document"
        );
        Ok(seed)
    }

    fn save(&self, document: &Document) -> Result<()> {
        self.write(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::types::Pair;

    fn seed() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string()]
    }

    #[test]
    fn test_first_load_writes_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path, seed());

        let doc = store.load().unwrap();
        assert_eq!(doc.users, vec!["Alice", "Bob"]);
        assert!(doc.pairs.is_empty());
        assert!(doc.last_updated.is_none());

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            on_disk,
            serde_json::json!({"users": ["Alice", "Bob"], "pairs": [], "lastUpdated": null})
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/data.json"), seed());

        let mut doc = store.load().unwrap();
        doc.users.push("Eve".to_string());
        doc.pairs = vec![Pair::new("Eve", "Alice"), Pair::new("Bob", "No Partner")];
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path, seed());
        store.load().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n  \"users\": ["));
    }

    #[test]
    fn test_malformed_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path, seed()).load().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Serialization(_))));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_schema_violation_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"users":["Alice","Alice"],"pairs":[],"lastUpdated":null}"#).unwrap();

        let err = JsonFileStore::new(&path, seed()).load().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corruption(_))));
    }

    #[test]
    fn test_existing_file_is_not_reseeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"users":[],"pairs":[],"lastUpdated":null}"#).unwrap();

        let doc = JsonFileStore::new(&path, seed()).load().unwrap();
        assert!(doc.users.is_empty());
    }
}
