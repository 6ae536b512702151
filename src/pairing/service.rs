//! Roster orchestration: one load-mutate-save cycle per operation
//!
//! Every operation runs under a single process-wide lock, so concurrent
//! requests cannot interleave their read and write and drop each other's
//! updates. The lock is never held across an await point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use parking_lot::Mutex;
use tracing::info;

use crate::core::error::{Error, Result};
use crate::pairing::engine::{generate_pairs, is_new_week};
use crate::storage::StorageImpl;
use crate::types::document::truncate_to_millis;
use crate::types::{Document, Pair};

/// Message for a missing or empty `name`
pub const NAME_REQUIRED: &str = "Name is required.";
/// Message for a duplicate user
pub const USER_EXISTS: &str = "User already exists.";
/// Message for deleting an unknown user
pub const USER_NOT_FOUND: &str = "User not found.";

/// Time source shared by the service and its callers
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Pairs as returned by [`RosterService::current_pairs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairsSnapshot {
    /// Current pairs
    pub pairs: Vec<Pair>,
    /// Time of the last rotation
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether this call performed the rotation
    pub rotated: bool,
}

/// Request-driven roster state machine over a [`StorageImpl`]
pub struct RosterService<S: StorageImpl> {
    store: Arc<S>,
    clock: SharedClock,
    write_lock: Mutex<()>,
}

impl<S: StorageImpl> RosterService<S> {
    /// Create a service over `store`, reading time from `clock`
    pub fn new(store: Arc<S>, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(self.clock.utc())
    }

    /// Run `f` against the loaded document under the service lock
    fn with_document<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock();
        let mut document = self.store.load()?;
        f(&mut document)
    }

    fn rotate(&self, document: &mut Document) {
        document.pairs = generate_pairs(&document.users);
        document.last_updated = Some(self.now());
    }

    /// Current pairs, regenerating them first if a week has elapsed
    pub fn current_pairs(&self) -> Result<PairsSnapshot> {
        self.with_document(|document| {
            let rotated = is_new_week(document.last_updated, self.clock.utc());
            if rotated {
                self.rotate(document);
                self.store.save(document)?;
                info!(
                    pairs = document.pairs.len(),
                    users = document.users.len(),
                    "Weekly rotation generated new pairs"
                );
            }

            Ok(PairsSnapshot {
                pairs: document.pairs.clone(),
                last_updated: document.last_updated,
                rotated,
            })
        })
    }

    /// All users in insertion order
    pub fn list_users(&self) -> Result<Vec<String>> {
        self.with_document(|document| Ok(std::mem::take(&mut document.users)))
    }

    /// Append `name` to the roster.
    ///
    /// `None` and the empty string are rejected as missing; duplicates are
    /// rejected as conflicts. Returns the updated user list.
    pub fn add_user(&self, name: Option<&str>) -> Result<Vec<String>> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(Error::validation(NAME_REQUIRED)),
        };

        self.with_document(|document| {
            if document.has_user(name) {
                return Err(Error::conflict(USER_EXISTS));
            }

            document.users.push(name.to_string());
            self.store.save(document)?;
            info!(user = %name, total = document.users.len(), "User added");
            Ok(document.users.clone())
        })
    }

    /// Remove the first entry equal to `name`. Existing pairs are left as they are.
    pub fn remove_user(&self, name: &str) -> Result<Vec<String>> {
        self.with_document(|document| {
            let index = document
                .users
                .iter()
                .position(|u| u == name)
                .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;

            document.users.remove(index);
            self.store.save(document)?;
            info!(user = %name, total = document.users.len(), "User removed");
            Ok(document.users.clone())
        })
    }

    /// Regenerate pairs now, regardless of when they last rotated
    pub fn reset_pairs(&self) -> Result<Vec<Pair>> {
        self.with_document(|document| {
            self.rotate(document);
            self.store.save(document)?;
            info!(pairs = document.pairs.len(), "Pairs reset manually");
            Ok(document.pairs.clone())
        })
    }
}
