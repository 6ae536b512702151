//! System utilities and monitoring

/// Prometheus counters
pub mod metrics;
