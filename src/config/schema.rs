//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the recommendation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Recommendation engine endpoint settings.
    pub engine: EngineConfig,

    /// Circuit breaker settings for the engine call path.
    pub breaker: BreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Local catalog seed entries.
    pub catalog: CatalogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Shape of the recommendation engine endpoint.
///
/// The engine contract has changed across integration generations; both
/// shapes remain in production, so the URL form is configuration, not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointStyle {
    /// `GET {base}/recommended-titles/isbn/{isbn}`
    PathSegment,
    /// `GET {base}/recommendations?isbn={isbn}`
    QueryParam,
}

/// Recommendation engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the recommendation engine.
    pub base_url: String,

    /// Which URL shape the target deployment expects.
    pub endpoint_style: EndpointStyle,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            endpoint_style: EndpointStyle::QueryParam,
            connect_secs: 3,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker identity, one per logical downstream dependency.
    pub name: String,

    /// Failure rate over the rolling window that opens the breaker.
    /// e.g., 0.5 for 50%.
    pub failure_rate_threshold: f32,

    /// Number of most recent call outcomes kept in the rolling window.
    pub window_size: usize,

    /// Minimum outcomes in the window before the failure rate is evaluated.
    pub min_calls: usize,

    /// How long the breaker stays open before probing, in milliseconds.
    pub cooldown_ms: u64,

    /// Maximum concurrent trial calls while half-open.
    pub half_open_max_calls: usize,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "recommendation-engine".to_string(),
            failure_rate_threshold: 0.5,
            window_size: 10,
            min_calls: 10,
            cooldown_ms: 30_000,
            half_open_max_calls: 1,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-call deadline for the recommendation fetch, in milliseconds.
    pub call_ms: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_ms: 3_000,
            request_secs: 30,
        }
    }
}

/// Local catalog seed data.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Books known locally, used to enrich sparse engine records.
    pub books: Vec<CatalogSeed>,
}

/// A single seeded catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSeed {
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
