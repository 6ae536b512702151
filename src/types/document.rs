//! The persisted roster document
//!
//! One JSON object holds the users, the current pairs and the rotation
//! timestamp:
//!
//! ```json
//! {
//!   "users": ["Alice", "Bob"],
//!   "pairs": [["Bob", "Alice"]],
//!   "lastUpdated": "2024-01-01T00:00:00.000Z"
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::error::StorageError;

/// Two user names grouped for the week; the second may be the "No Partner" sentinel.
///
/// Serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair(pub String, pub String);

impl Pair {
    /// Create a pair from two names
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(first.into(), second.into())
    }

    /// Both names of the pair
    pub fn members(&self) -> [&str; 2] {
        [self.0.as_str(), self.1.as_str()]
    }

    /// Whether either side of the pair is the given name
    pub fn contains(&self, name: &str) -> bool {
        self.0 == name || self.1 == name
    }
}

/// Whole persisted state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Insertion-ordered unique user names
    #[serde(default)]
    pub users: Vec<String>,

    /// Pairs from the last rotation. May name users removed since then.
    #[serde(default)]
    pub pairs: Vec<Pair>,

    /// When pairs were last generated; `None` until the first rotation
    #[serde(default, with = "iso_millis")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Document {
    /// A fresh document holding `users`, no pairs and no rotation timestamp
    pub fn seeded<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            pairs: Vec::new(),
            last_updated: None,
        }
    }

    /// Whether `name` is a current user
    pub fn has_user(&self, name: &str) -> bool {
        self.users.iter().any(|u| u == name)
    }

    /// Schema checks run on every load so corrupt files fail fast
    pub fn validate(&self) -> Result<(), StorageError> {
        let mut seen = HashSet::with_capacity(self.users.len());
        for user in &self.users {
            if user.is_empty() {
                return Err(StorageError::Corruption("empty user name".to_string()));
            }
            if !seen.insert(user.as_str()) {
                return Err(StorageError::Corruption(format!("duplicate user '{}'", user)));
            }
        }

        if let Some(pair) = self
            .pairs
            .iter()
            .find(|pair| pair.members().iter().any(|name| name.is_empty()))
        {
            return Err(StorageError::Corruption(format!(
                "pair {:?} has an empty name",
                pair
            )));
        }

        Ok(())
    }
}

/// Truncate to the millisecond precision the timestamp is persisted with
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.nanosecond() % 1_000_000_000;
    let millis_nanos = (nanos / 1_000_000) * 1_000_000;
    ts.with_nanosecond(millis_nanos).unwrap_or(ts)
}

/// Render a timestamp as `2024-01-01T00:00:00.000Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `Option<DateTime<Utc>>` as an ISO-8601 string with millisecond precision, or null
pub mod iso_millis {
    use super::format_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `"YYYY-MM-DDTHH:MM:SS.mmmZ"` or `null`
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Accept any RFC 3339 string, or `null`
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}
