//! Configuration management for the pairing service
//!
//! Settings come from a TOML file, then environment overrides, then CLI
//! overrides applied by the binary.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pair-rotation.toml";

/// Users written to a fresh store on first access
pub const DEFAULT_SEED_USERS: [&str; 4] = ["Alice", "Bob", "Charlie", "Diana"];

/// Available storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Whole-document JSON file on disk
    JsonFile,
    /// In-process document, lost on restart
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json_file" | "json" | "file" => Ok(StorageType::JsonFile),
            "memory" => Ok(StorageType::Memory),
            other => Err(Error::config(format!(
                "Invalid storage type: {}. Valid options: json_file, memory",
                other
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub storage_type: StorageType,

    /// Path of the JSON document for the file backend
    pub data_file: PathBuf,

    /// Users the document is seeded with when nothing is persisted yet
    pub seed_users: Vec<String>,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Expose Prometheus metrics on `/metrics`
    pub enable_prometheus: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::JsonFile,
            data_file: PathBuf::from("./data.json"),
            seed_users: DEFAULT_SEED_USERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable_prometheus: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file (if present) and environment
    pub fn load() -> Result<Self> {
        let path = std::path::Path::new(DEFAULT_CONFIG_FILE);
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };
        config.finish()
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::from_file(path)?.finish()
    }

    /// Parse a TOML file. Missing sections and keys fall back to defaults.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    fn finish(mut self) -> Result<Self> {
        self.apply_env_overrides()?;
        self.validate()?;
        Ok(self)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; `PAIRS_*` keys are recognised
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PAIRS_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(data_file) = lookup("PAIRS_DATA_FILE") {
            self.storage.data_file = PathBuf::from(data_file);
        }

        if let Some(storage_type) = lookup("PAIRS_STORAGE_TYPE") {
            self.storage.storage_type = storage_type.parse()?;
        }

        if let Some(level) = lookup("PAIRS_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("PAIRS_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level: {}", other))),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => return Err(Error::config(format!("Invalid log format: {}", other))),
        }

        if self.storage.storage_type == StorageType::JsonFile
            && self.storage.data_file.as_os_str().is_empty()
        {
            return Err(Error::config("Data file path must not be empty"));
        }

        let mut seen = HashSet::new();
        for name in &self.storage.seed_users {
            if name.is_empty() {
                return Err(Error::config("Seed users must not contain empty names"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!("Duplicate seed user: {}", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.storage.storage_type, StorageType::JsonFile);
        assert_eq!(config.storage.seed_users, vec!["Alice", "Bob", "Charlie", "Diana"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            http_addr = "127.0.0.1:4000"

            [storage]
            storage_type = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_addr.port(), 4000);
        assert_eq!(config.storage.storage_type, StorageType::Memory);
        assert_eq!(config.storage.data_file, PathBuf::from("./data.json"));
        assert_eq!(config.logging.level, "info");
        assert!(config.metrics.enable_prometheus);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PAIRS_HTTP_ADDR", "127.0.0.1:9999"),
            ("PAIRS_DATA_FILE", "/tmp/pairs.json"),
            ("PAIRS_STORAGE_TYPE", "memory"),
            ("PAIRS_LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.http_addr.port(), 9999);
        assert_eq!(config.storage.data_file, PathBuf::from("/tmp/pairs.json"));
        assert_eq!(config.storage.storage_type, StorageType::Memory);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_env_address() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "PAIRS_HTTP_ADDR").then(|| "not-an-address".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.seed_users = vec!["Alice".to_string(), "Alice".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.seed_users = vec![String::new()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.data_file = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_type_parse() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("json_file".parse::<StorageType>().unwrap(), StorageType::JsonFile);
        assert!("distributed".parse::<StorageType>().is_err());
    }
}
