//! Per-call timeout plus circuit breaker around any provider.
//!
//! A debate makes dozens of sequential calls. A hung call must not stall the
//! run, and a dead endpoint should fail fast for the remaining phases.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through
    Closed,
    /// Calls fail immediately until the cooldown has elapsed
    Open,
    /// Trial calls decide whether to close again
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct LlmCircuitConfig {
    /// Consecutive transport failures that open the circuit
    pub failure_threshold: u32,
    /// Successful trial calls needed to close it again
    pub recovery_successes: u32,
    /// How long an open circuit rejects calls
    pub cooldown: Duration,
    /// Upper bound on a single completion; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for LlmCircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_successes: 2,
            cooldown: Duration::from_secs(30),
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl LlmCircuitConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

/// Counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub requests: u64,
    pub failures: u64,
    /// Times the circuit opened
    pub trips: u64,
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    consecutive_failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

impl Breaker {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            trial_successes: 0,
            opened_at: None,
        }
    }

    /// Whether a call may go through; moves an expired open circuit to half-open.
    fn admit(&mut self, cooldown: Duration) -> bool {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let expired = self.opened_at.is_some_and(|t| t.elapsed() >= cooldown);
                if expired {
                    self.state = CircuitState::HalfOpen;
                    self.trial_successes = 0;
                }
                expired
            }
        }
    }

    /// Returns true when this success closed a half-open circuit.
    fn succeed(&mut self, needed: u32) -> bool {
        self.consecutive_failures = 0;
        if self.state != CircuitState::HalfOpen {
            return false;
        }
        self.trial_successes += 1;
        if self.trial_successes >= needed {
            self.state = CircuitState::Closed;
            self.opened_at = None;
            return true;
        }
        false
    }

    /// Returns true when this failure opened the circuit.
    fn fail(&mut self, threshold: u32) -> bool {
        self.consecutive_failures += 1;
        let trips = self.state == CircuitState::HalfOpen
            || (self.state == CircuitState::Closed && self.consecutive_failures >= threshold);
        if trips {
            self.state = CircuitState::Open;
            self.opened_at = Some(Instant::now());
        }
        trips
    }
}

/// Transport-level failures count against the breaker; a bad response does not.
fn trips_breaker(error: &LlmError) -> bool {
    matches!(
        error,
        LlmError::ConnectionFailed(_)
            | LlmError::NotAvailable
            | LlmError::RateLimited
            | LlmError::Timeout(_)
    )
}

/// Wraps a provider with a call timeout and a circuit breaker
#[derive(Debug)]
pub struct ResilientProvider<P: LlmProvider> {
    inner: P,
    config: LlmCircuitConfig,
    breaker: Mutex<Breaker>,
    requests: AtomicU64,
    failures: AtomicU64,
    trips: AtomicU64,
}

impl<P: LlmProvider> ResilientProvider<P> {
    pub fn new(provider: P, config: LlmCircuitConfig) -> Self {
        Self {
            inner: provider,
            config,
            breaker: Mutex::new(Breaker::new()),
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            trips: AtomicU64::new(0),
        }
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.breaker.lock().await.state
    }

    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            trips: self.trips.load(Ordering::Relaxed),
        }
    }

    async fn call_inner(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.complete(request))
                .await
                .unwrap_or_else(|_| Err(LlmError::Timeout(limit.as_millis() as u64))),
            None => self.inner.complete(request).await,
        }
    }
}

#[async_trait]
impl<P: LlmProvider + 'static> LlmProvider for ResilientProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_available(&self) -> bool {
        self.breaker.lock().await.admit(self.config.cooldown) && self.inner.is_available().await
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if !self.breaker.lock().await.admit(self.config.cooldown) {
            return Err(LlmError::NotAvailable);
        }

        let outcome = self.call_inner(request).await;
        let mut breaker = self.breaker.lock().await;
        match &outcome {
            Ok(_) => {
                if breaker.succeed(self.config.recovery_successes) {
                    tracing::info!(provider = %self.inner.name(), "Circuit closed");
                }
            }
            Err(e) if trips_breaker(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                if breaker.fail(self.config.failure_threshold) {
                    self.trips.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        provider = %self.inner.name(),
                        failures = breaker.consecutive_failures,
                        error = %e,
                        "Circuit opened"
                    );
                }
            }
            Err(_) => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[test]
    fn test_breaker_lifecycle() {
        let mut breaker = Breaker::new();
        assert!(!breaker.fail(2));
        assert!(breaker.fail(2));
        assert_eq!(breaker.state, CircuitState::Open);
        assert!(!breaker.admit(Duration::from_secs(60)));

        assert!(breaker.admit(Duration::ZERO));
        assert_eq!(breaker.state, CircuitState::HalfOpen);
        assert!(!breaker.succeed(2));
        assert!(breaker.succeed(2));
        assert_eq!(breaker.state, CircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let mut breaker = Breaker::new();
        breaker.fail(1);
        assert!(breaker.admit(Duration::ZERO));
        assert!(breaker.fail(10));
        assert_eq!(breaker.state, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let mock = MockProvider::constant("late").with_latency(200);
        let config = LlmCircuitConfig::default().with_call_timeout(Duration::from_millis(20));
        let resilient = ResilientProvider::new(mock, config);

        let err = resilient.ask("test").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(20)));
        assert_eq!(resilient.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_circuit_opens_after_repeated_failures() {
        let config = LlmCircuitConfig {
            failure_threshold: 2,
            ..LlmCircuitConfig::default()
        };
        let resilient = ResilientProvider::new(MockProvider::failing("down"), config);

        assert!(resilient.ask("a").await.is_err());
        assert!(resilient.ask("b").await.is_err());
        assert_eq!(resilient.circuit_state().await, CircuitState::Open);
        assert_eq!(resilient.stats().trips, 1);

        // Rejected without reaching the inner provider
        let err = resilient.ask("c").await.unwrap_err();
        assert!(matches!(err, LlmError::NotAvailable));
    }
}
