//! Circuit breaker for the odds feed.
//!
//! Consecutive request failures open the circuit so that a dead feed costs
//! one fast rejection per event instead of one full timeout per event.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Circuit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCircuitState {
    /// Requests flow normally
    Closed,
    /// Requests are rejected until the recovery timeout elapses
    Open,
    /// Trial requests allowed; one failure reopens
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct ApiCircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time spent open before allowing trial requests
    pub recovery_timeout: Duration,
    /// Successful trial requests needed to close again
    pub success_threshold: u32,
}

impl Default for ApiCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    circuit: ApiCircuitState,
    consecutive_failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

/// Shared by every in-flight request of one client.
#[derive(Debug)]
pub struct ApiCircuitBreaker {
    name: String,
    config: ApiCircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl ApiCircuitBreaker {
    pub fn new(name: &str, config: ApiCircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            inner: Mutex::new(BreakerState {
                circuit: ApiCircuitState::Closed,
                consecutive_failures: 0,
                trial_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a request may go out now. Moves Open -> HalfOpen once the
    /// recovery timeout has passed.
    pub fn is_available(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.circuit {
            ApiCircuitState::Closed | ApiCircuitState::HalfOpen => true,
            ApiCircuitState::Open => {
                let recovered = inner
                    .opened_at
                    .map_or(true, |t| t.elapsed() >= self.config.recovery_timeout);
                if recovered {
                    inner.circuit = ApiCircuitState::HalfOpen;
                    inner.trial_successes = 0;
                    tracing::debug!("Circuit '{}' half-open, allowing trial request", self.name);
                }
                recovered
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = 0;

        if inner.circuit == ApiCircuitState::HalfOpen {
            inner.trial_successes += 1;
            if inner.trial_successes < self.config.success_threshold {
                return;
            }
            tracing::info!(
                "Circuit '{}' closed after {} successful trial requests",
                self.name,
                inner.trial_successes
            );
        }

        inner.circuit = ApiCircuitState::Closed;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;

        match inner.circuit {
            ApiCircuitState::Closed
                if inner.consecutive_failures >= self.config.failure_threshold =>
            {
                inner.circuit = ApiCircuitState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!(
                    "Circuit '{}' OPENED after {} consecutive failures",
                    self.name,
                    inner.consecutive_failures
                );
            }
            ApiCircuitState::HalfOpen => {
                inner.circuit = ApiCircuitState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!("Circuit '{}' re-OPENED during trial", self.name);
            }
            _ => {}
        }
    }

    pub fn state(&self) -> ApiCircuitState {
        self.inner.lock().circuit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.circuit = ApiCircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.trial_successes = 0;
        inner.opened_at = None;
    }
}
