//! Prometheus counters for roster activity
//!
//! Each [`Metrics`] owns its registry, so several app instances (tests,
//! embedded servers) can coexist in one process.

use crate::core::error::Result;
use prometheus::{IntCounter, Registry, TextEncoder};

/// Counters for roster and pairing operations
pub struct Metrics {
    registry: Registry,
    /// Weekly rotations triggered by `GET /pairs`
    pub rotations: IntCounter,
    /// Manual resets via `POST /pairs/reset`
    pub resets: IntCounter,
    /// Users added
    pub users_added: IntCounter,
    /// Users removed
    pub users_removed: IntCounter,
    /// Requests answered with a 4xx or 5xx
    pub request_errors: IntCounter,
}

impl Metrics {
    /// Create and register all counters on a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let rotations = IntCounter::new(
            "pairs_rotations_total",
            "Total number of weekly pair rotations",
        )?;
        let resets = IntCounter::new("pairs_resets_total", "Total number of manual pair resets")?;
        let users_added = IntCounter::new("pairs_users_added_total", "Total number of users added")?;
        let users_removed =
            IntCounter::new("pairs_users_removed_total", "Total number of users removed")?;
        let request_errors = IntCounter::new(
            "pairs_request_errors_total",
            "Total number of requests that failed",
        )?;

        registry.register(Box::new(rotations.clone()))?;
        registry.register(Box::new(resets.clone()))?;
        registry.register(Box::new(users_added.clone()))?;
        registry.register(Box::new(users_removed.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry,
            rotations,
            resets,
            users_added,
            users_removed,
            request_errors,
        })
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        Ok(encoder.encode_to_string(&families)?)
    }
}
