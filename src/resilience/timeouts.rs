//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race a guarded call against its deadline
//! - Return a distinct error on expiry, never a hung call
//! - Drop the in-flight future on expiry (best-effort cancellation; the
//!   transport aborts the request when its future is dropped)
//!
//! The dropped future releases its breaker permit unresolved, which records
//! the single failure for the attempt; a late response can no longer report.

use std::future::Future;
use std::time::Duration;

/// The wrapped operation did not complete within its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Race `operation` against `budget`.
///
/// The operation's own result (success or failure) passes through unchanged
/// when it resolves first.
pub async fn with_deadline<F>(budget: Duration, operation: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(budget, operation)
        .await
        .map_err(|_| DeadlineExceeded(budget))
}
