//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Recommendation fetch:
//!     → timeouts.rs (race the guarded call against its deadline)
//!     → circuit_breaker.rs (admit or fail fast, record the one outcome)
//!     → outbound HTTP call
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every engine call has a deadline
//! - No retries in this subsystem; retry policy belongs to the caller
//! - The breaker is the single authority on "should we attempt a call"
//! - Each attempt records exactly one outcome, timeout included

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{BreakerRegistry, BreakerState, CallPermit, CircuitBreaker};
pub use timeouts::{with_deadline, DeadlineExceeded};
