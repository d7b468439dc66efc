//! Recommendation fetch subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → pipeline.rs (fallback & enrichment)
//!     → resilience::timeouts (deadline race)
//!     → resilience::circuit_breaker (admission + outcome accounting)
//!     → client.rs (outbound GET to the engine)
//! ```
//!
//! Each layer can short-circuit the ones below it. Degraded results are
//! first-class: an empty list is a successful outcome, and every failure is
//! a typed [`RecommendError`] the HTTP layer maps to a status code without
//! inspecting message text.

pub mod client;
pub mod pipeline;

pub use client::HttpRecommendationClient;
pub use pipeline::RecommendationPipeline;

use std::future::Future;

use serde::{Deserialize, Serialize};

/// A record as returned by the recommendation engine.
///
/// Field casing differs between engine generations, hence the aliases.
/// Optional fields arrive absent or empty; both normalize to `""`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RecommendationRecord {
    #[serde(default, alias = "ISBN")]
    pub isbn: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "author")]
    pub authors: String,

    /// Present in some engine payloads; never forwarded to callers.
    #[serde(default)]
    pub publisher: Option<String>,
}

/// The public-facing shape of a recommendation.
///
/// Deliberately has no publisher field, so the disallowed data cannot leak
/// through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecommendation {
    pub isbn: String,
    pub title: String,
    pub authors: String,
}

/// Failure taxonomy for the fetch pipeline.
///
/// A 404 from the engine is not represented here; it normalizes to an empty
/// successful result before errors come into play.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendError {
    /// The engine returned an unexpected status, the connection failed, or
    /// the payload did not parse.
    #[error("recommendation engine call failed: {0}")]
    Upstream(String),

    /// The call did not complete within the configured deadline.
    #[error("recommendation engine call timed out")]
    Timeout,

    /// The circuit breaker rejected the call without attempting it.
    #[error("recommendation circuit is open")]
    CircuitOpen,
}

/// Source of raw recommendation records for an ISBN.
///
/// Implemented by the HTTP client; the seam exists so the pipeline can be
/// exercised against scripted sources.
pub trait RecommendationSource: Send + Sync + 'static {
    fn fetch(
        &self,
        isbn: &str,
    ) -> impl Future<Output = Result<Vec<RecommendationRecord>, RecommendError>> + Send;
}
