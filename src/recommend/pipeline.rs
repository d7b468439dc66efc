//! Fallback and enrichment pipeline.
//!
//! # Responsibilities
//! - Orchestrate deadline → breaker admission → engine fetch
//! - Enrich sparse records from the local catalog
//! - Strip disallowed fields (publisher) from the output
//! - Map every failure to a typed [`RecommendError`]
//!
//! The pipeline is stateless apart from the breaker handle it shares with
//! every other invocation for the same downstream dependency.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogLookup;
use crate::recommend::{
    EnrichedRecommendation, RecommendError, RecommendationRecord, RecommendationSource,
};
use crate::resilience::{with_deadline, CircuitBreaker};

/// Resilient "related books" lookup for one downstream engine.
pub struct RecommendationPipeline<S, C> {
    source: S,
    catalog: C,
    breaker: Arc<CircuitBreaker>,
    call_budget: Duration,
}

impl<S, C> RecommendationPipeline<S, C>
where
    S: RecommendationSource,
    C: CatalogLookup,
{
    pub fn new(source: S, catalog: C, breaker: Arc<CircuitBreaker>, call_budget: Duration) -> Self {
        Self {
            source,
            catalog,
            breaker,
            call_budget,
        }
    }

    /// Fetch and enrich related books for `isbn`.
    ///
    /// An empty list is a successful outcome (the engine had nothing, or
    /// answered 404). Errors are typed so the HTTP layer can map them to
    /// distinct statuses.
    pub async fn related_books(
        &self,
        isbn: &str,
    ) -> Result<Vec<EnrichedRecommendation>, RecommendError> {
        let guarded = async {
            let Some(permit) = self.breaker.try_acquire() else {
                tracing::warn!(isbn, breaker = %self.breaker.name(), "call rejected, circuit open");
                return Err(RecommendError::CircuitOpen);
            };
            let result = self.source.fetch(isbn).await;
            permit.complete(result.is_ok());
            result
        };

        let records = match with_deadline(self.call_budget, guarded).await {
            Ok(result) => result?,
            Err(deadline) => {
                // The guarded future was dropped; its permit already
                // recorded the one failure for this attempt.
                tracing::warn!(isbn, budget = ?deadline.0, "recommendation call abandoned at deadline");
                return Err(RecommendError::Timeout);
            }
        };

        Ok(records
            .into_iter()
            .map(|record| self.enrich(isbn, record))
            .collect())
    }

    /// Fill missing fields from the local catalog and drop everything the
    /// public shape does not carry.
    fn enrich(&self, requested_isbn: &str, record: RecommendationRecord) -> EnrichedRecommendation {
        let isbn = if record.isbn.is_empty() {
            requested_isbn.to_string()
        } else {
            record.isbn
        };

        let mut title = record.title;
        let mut authors = record.authors;
        if title.is_empty() || authors.is_empty() {
            if let Some(entry) = self.catalog.lookup(&isbn) {
                if title.is_empty() {
                    title = entry.title;
                }
                if authors.is_empty() {
                    authors = entry.author;
                }
            }
        }

        EnrichedRecommendation {
            isbn,
            title,
            authors,
        }
    }
}
