//! Circuit breaker for downstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: testing if the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure rate ≥ threshold over the rolling window
//! Open → Half-Open: after the cooldown elapses
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! # Design Decisions
//! - One breaker per logical downstream dependency, shared via the registry
//! - All state behind a single mutex; critical sections never await
//! - Outcomes recorded through a consuming `CallPermit`, so each attempt
//!   counts exactly once even when the call is abandoned mid-flight

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Externally observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    /// Numeric code for the state gauge (0 closed, 1 open, 2 half-open).
    pub fn code(self) -> u8 {
        match self {
            BreakerState::Closed => 0,
            BreakerState::Open => 1,
            BreakerState::HalfOpen => 2,
        }
    }
}

/// How a guarded attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
    /// Dropped before resolving, e.g. abandoned at the deadline.
    Abandoned,
}

impl CallOutcome {
    fn is_success(self) -> bool {
        matches!(self, CallOutcome::Success)
    }

    fn label(self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Abandoned => "abandoned",
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    /// Set while Open; cleared on every other transition.
    opened_at: Option<Instant>,
    /// Rolling window of recent outcomes, `true` for success.
    window: VecDeque<bool>,
    /// Trial calls currently in flight while Half-Open.
    trials_in_flight: usize,
}

/// Stateful gate in front of a flaky dependency.
///
/// Calls acquire a [`CallPermit`] before attempting the downstream call and
/// report their outcome through it. While Open, acquisition fails without
/// touching the dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        let name = config.name.clone();
        Self {
            name,
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                opened_at: None,
                window: VecDeque::new(),
                trials_in_flight: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, without advancing Open → Half-Open.
    pub fn state(&self) -> BreakerState {
        self.inner.lock().expect("breaker mutex poisoned").state
    }

    /// Try to admit one attempt.
    ///
    /// Returns `None` while Open (before the cooldown) and while Half-Open
    /// with all trial slots taken. The first acquisition after the cooldown
    /// moves the breaker to Half-Open and is admitted as a trial.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CallPermit> {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        let trial = match inner.state {
            BreakerState::Closed => false,
            BreakerState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|t| t.elapsed() >= Duration::from_millis(self.config.cooldown_ms))
                    .unwrap_or(true);
                if !cooled_down {
                    drop(inner);
                    metrics::record_fetch_rejected(&self.name);
                    return None;
                }
                self.transition(&mut inner, BreakerState::HalfOpen);
                inner.trials_in_flight = 1;
                true
            }
            BreakerState::HalfOpen => {
                if inner.trials_in_flight >= self.config.half_open_max_calls {
                    drop(inner);
                    metrics::record_fetch_rejected(&self.name);
                    return None;
                }
                inner.trials_in_flight += 1;
                true
            }
        };
        drop(inner);

        Some(CallPermit {
            breaker: Arc::clone(self),
            started: Instant::now(),
            trial,
            resolved: false,
        })
    }

    fn record(&self, outcome: CallOutcome, trial: bool, latency: Duration) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");

        if trial {
            inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
            // A lingering trial that resolves after another trial already
            // reopened (or closed) the breaker has nothing left to decide.
            if inner.state == BreakerState::HalfOpen {
                if outcome.is_success() {
                    self.transition(&mut inner, BreakerState::Closed);
                } else {
                    self.transition(&mut inner, BreakerState::Open);
                    inner.opened_at = Some(Instant::now());
                }
            }
        } else {
            inner.window.push_back(outcome.is_success());
            while inner.window.len() > self.config.window_size {
                inner.window.pop_front();
            }

            if inner.state == BreakerState::Closed
                && inner.window.len() >= self.config.min_calls
                && self.failure_rate(&inner.window) >= self.config.failure_rate_threshold
            {
                self.transition(&mut inner, BreakerState::Open);
                inner.opened_at = Some(Instant::now());
            }
        }
        drop(inner);

        metrics::record_fetch_outcome(&self.name, outcome.label(), latency);
    }

    fn failure_rate(&self, window: &VecDeque<bool>) -> f32 {
        if window.is_empty() {
            return 0.0;
        }
        let failures = window.iter().filter(|success| !**success).count();
        failures as f32 / window.len() as f32
    }

    /// Apply a state transition. Statistics reset on every transition; the
    /// window is only meaningful while Closed.
    fn transition(&self, inner: &mut BreakerInner, next: BreakerState) {
        let prev = inner.state;
        inner.state = next;
        inner.opened_at = None;
        inner.window.clear();
        inner.trials_in_flight = 0;

        match next {
            BreakerState::Open => tracing::warn!(
                breaker = %self.name,
                from = ?prev,
                cooldown_ms = self.config.cooldown_ms,
                "circuit breaker opened"
            ),
            _ => tracing::info!(breaker = %self.name, from = ?prev, to = ?next, "circuit breaker transition"),
        }
        metrics::record_breaker_state(&self.name, next.code());
    }
}

/// Admission ticket for a single guarded attempt.
///
/// Consume it with [`CallPermit::complete`] once the call resolves. If the
/// permit is dropped unconsumed (the deadline abandoned the call), one
/// failure is recorded on drop. Either way the attempt counts exactly once.
#[derive(Debug)]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    started: Instant,
    trial: bool,
    resolved: bool,
}

impl CallPermit {
    /// Record the attempt's outcome.
    pub fn complete(mut self, success: bool) {
        self.resolved = true;
        let outcome = if success {
            CallOutcome::Success
        } else {
            CallOutcome::Failure
        };
        self.breaker.record(outcome, self.trial, self.started.elapsed());
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.resolved {
            self.breaker
                .record(CallOutcome::Abandoned, self.trial, self.started.elapsed());
        }
    }
}

/// One breaker per logical downstream dependency, keyed by name.
///
/// Constructed once at startup and handed by reference to every pipeline,
/// replacing the hidden-singleton pattern with explicit ownership.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the breaker for `config.name`, creating it on first use.
    pub fn get_or_create(&self, config: &BreakerConfig) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(config.name.clone())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(config.clone())))
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| Arc::clone(entry.value()))
    }
}
