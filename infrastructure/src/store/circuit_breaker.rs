//! Circuit breaker around the relational agent store.
//!
//! After `failure_threshold` consecutive failures the circuit opens and
//! queries are rejected with [`StoreError::CircuitOpen`] without touching the
//! store. Once `timeout` has elapsed the breaker turns half-open and admits
//! one probe at a time; `success_threshold` consecutive successful probes close
//! the circuit again.
//!
//! A call that exceeds the store's per-call deadline, or whose future is
//! dropped before it completes, counts as a failure.

use crate::config::FileCircuitBreakerConfig;
use async_trait::async_trait;
use panel_application::ports::agent_store::{AgentStorePort, StoreError};
use panel_domain::{Agent, AgentQuery};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Health of the wrapped store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        };
        write!(f, "{}", s)
    }
}

/// Configuration for circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&FileCircuitBreakerConfig::default())
    }
}

impl From<&FileCircuitBreakerConfig> for CircuitBreakerConfig {
    fn from(file: &FileCircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: file.failure_threshold.max(1),
            success_threshold: file.success_threshold.max(1),
            timeout: Duration::from_secs(file.timeout_seconds),
        }
    }
}

pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure: RwLock<Option<Instant>>,
    probe_in_flight: AtomicBool,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: AtomicU8::new(CircuitState::Closed as u8),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure: RwLock::new(None),
            probe_in_flight: AtomicBool::new(false),
            config,
        }
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::SeqCst))
    }

    /// Whether a call may proceed. In half-open state only the caller that
    /// claims the probe slot gets `true` until that probe is recorded.
    pub fn is_allowed(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.claim_probe(),
            CircuitState::Open => {
                let expired = self
                    .last_failure
                    .read()
                    .ok()
                    .and_then(|guard| *guard)
                    .is_some_and(|last| last.elapsed() >= self.config.timeout);
                if !expired {
                    return false;
                }
                let _ = self.state.compare_exchange(
                    CircuitState::Open as u8,
                    CircuitState::HalfOpen as u8,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
                self.claim_probe()
            }
        }
    }

    fn claim_probe(&self) -> bool {
        self.probe_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);

        if self.state() == CircuitState::HalfOpen {
            let count = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
            if count >= self.config.success_threshold {
                self.state
                    .store(CircuitState::Closed as u8, Ordering::SeqCst);
                self.success_count.store(0, Ordering::SeqCst);
            }
        }
    }

    pub fn record_failure(&self) {
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);

        if let Ok(mut guard) = self.last_failure.write() {
            *guard = Some(Instant::now());
        }

        // A failed probe reopens immediately.
        if self.state() == CircuitState::HalfOpen {
            self.state.store(CircuitState::Open as u8, Ordering::SeqCst);
            return;
        }

        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.config.failure_threshold {
            self.state.store(CircuitState::Open as u8, Ordering::SeqCst);
        }
    }

    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed as u8, Ordering::SeqCst);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_failure.write() {
            *guard = None;
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("state", &self.state())
            .field("failure_count", &self.failure_count.load(Ordering::Relaxed))
            .field("success_count", &self.success_count.load(Ordering::Relaxed))
            .finish()
    }
}

/// [`AgentStorePort`] decorator that guards the inner store with a [`CircuitBreaker`].
pub struct CircuitBreakerStore<S> {
    inner: S,
    breaker: CircuitBreaker,
    call_timeout: Option<Duration>,
}

impl<S: AgentStorePort> CircuitBreakerStore<S> {
    pub fn new(inner: S, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(config),
            call_timeout: None,
        }
    }

    /// Deadline for each inner call; expiry returns [`StoreError::Timeout`]
    /// and counts as a failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn on_success(&self, before: CircuitState) {
        self.breaker.record_success();
        if before != CircuitState::Closed && self.breaker.state() == CircuitState::Closed {
            info!(event = "agent_store_circuit_closed", "Agent store recovered");
        }
    }

    fn on_failure(&self, before: CircuitState, error: &dyn std::fmt::Display) {
        self.breaker.record_failure();
        if self.breaker.state() == CircuitState::Open && before != CircuitState::Open {
            warn!(
                event = "agent_store_circuit_opened",
                error = %error,
                "Agent store circuit opened"
            );
        }
    }
}

/// Records a failure if the call is dropped before it reports an outcome.
struct PendingCall<'a, S: AgentStorePort> {
    store: &'a CircuitBreakerStore<S>,
    before: CircuitState,
    settled: bool,
}

impl<S: AgentStorePort> PendingCall<'_, S> {
    fn settle(mut self, result: &Result<Vec<Agent>, StoreError>) {
        self.settled = true;
        match result {
            Ok(_) => self.store.on_success(self.before),
            Err(e) => self.store.on_failure(self.before, e),
        }
    }
}

impl<S: AgentStorePort> Drop for PendingCall<'_, S> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.on_failure(self.before, &"call cancelled");
        }
    }
}

#[async_trait]
impl<S: AgentStorePort> AgentStorePort for CircuitBreakerStore<S> {
    async fn query_agents(&self, query: &AgentQuery) -> Result<Vec<Agent>, StoreError> {
        if !self.breaker.is_allowed() {
            return Err(StoreError::CircuitOpen);
        }

        let pending = PendingCall {
            store: self,
            before: self.breaker.state(),
            settled: false,
        };
        let result = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.query_agents(query))
                .await
                .unwrap_or(Err(StoreError::Timeout)),
            None => self.inner.query_agents(query).await,
        };
        pending.settle(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_application::ports::agent_search::{AgentSearchPort, SearchError};
    use panel_application::{BehaviorConfig, FindCandidatesUseCase};
    use panel_domain::{SearchHit, SearchRequest};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn config(failures: u32, successes: u32, timeout: Duration) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: failures,
            success_threshold: successes,
            timeout,
        }
    }

    #[test]
    fn test_circuit_breaker_closed() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.is_allowed());
    }

    #[test]
    fn test_circuit_breaker_opens_on_failures() {
        let cb = CircuitBreaker::new(config(3, 2, Duration::from_secs(60)));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.is_allowed());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = CircuitBreaker::new(config(2, 1, Duration::from_secs(60)));
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_timeout_then_closes() {
        let cb = CircuitBreaker::new(config(1, 2, Duration::ZERO));
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        assert!(cb.is_allowed());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = CircuitBreaker::new(config(3, 1, Duration::ZERO));
        for _ in 0..3 {
            cb.record_failure();
        }
        assert!(cb.is_allowed());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_half_open_admits_one_probe_at_a_time() {
        let cb = CircuitBreaker::new(config(1, 2, Duration::ZERO));
        cb.record_failure();

        assert!(cb.is_allowed());
        assert!(!cb.is_allowed());

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.is_allowed());
        assert!(!cb.is_allowed());

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.is_allowed());
        assert!(cb.is_allowed());
    }

    #[test]
    fn test_reset() {
        let cb = CircuitBreaker::new(config(1, 1, Duration::from_secs(60)));
        cb.record_failure();
        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.is_allowed());
    }

    struct FlakyStore {
        fail: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FlakyStore {
        fn failing() -> Self {
            Self {
                fail: true,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn hanging() -> Self {
            Self {
                fail: false,
                delay: Some(Duration::from_secs(60)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AgentStorePort for FlakyStore {
        async fn query_agents(&self, _query: &AgentQuery) -> Result<Vec<Agent>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                Err(StoreError::Query("connection refused".to_string()))
            } else {
                Ok(vec![Agent::new("a1", "general-practitioner", 3)])
            }
        }
    }

    #[tokio::test]
    async fn test_store_short_circuits_when_open() {
        let store = CircuitBreakerStore::new(
            FlakyStore::failing(),
            config(2, 1, Duration::from_secs(60)),
        );
        let query = AgentQuery::emergency(3);

        for _ in 0..2 {
            let err = store.query_agents(&query).await.unwrap_err();
            assert!(matches!(err, StoreError::Query(_)));
        }
        let err = store.query_agents(&query).await.unwrap_err();
        assert_eq!(err, StoreError::CircuitOpen);
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_timeout_counts_as_failure() {
        let store = CircuitBreakerStore::new(
            FlakyStore::hanging(),
            config(1, 1, Duration::from_secs(60)),
        )
        .with_timeout(Some(Duration::from_millis(20)));
        let query = AgentQuery::fallback(&["cardiology".to_string()], 5);

        let err = store.query_agents(&query).await.unwrap_err();
        assert_eq!(err, StoreError::Timeout);
        assert_eq!(store.breaker().state(), CircuitState::Open);

        for _ in 0..2 {
            let err = store.query_agents(&query).await.unwrap_err();
            assert_eq!(err, StoreError::CircuitOpen);
        }
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
    }

    struct OfflineSearch;

    #[async_trait]
    impl AgentSearchPort for OfflineSearch {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
            Err(SearchError::Unavailable("index offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_hanging_store_opens_circuit_under_retrieval_deadline() {
        let store = Arc::new(CircuitBreakerStore::new(
            FlakyStore::hanging(),
            config(1, 1, Duration::from_secs(60)),
        ));
        let use_case = FindCandidatesUseCase::new(Arc::new(OfflineSearch), Arc::clone(&store))
            .with_behavior(BehaviorConfig {
                timeout: Some(Duration::from_millis(20)),
            });

        for _ in 0..3 {
            use_case.execute("heart", &["cardiology".to_string()], 5).await;
        }

        assert_eq!(store.breaker().state(), CircuitState::Open);
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_call_counts_as_failure() {
        let store = CircuitBreakerStore::new(
            FlakyStore::hanging(),
            config(1, 1, Duration::from_secs(60)),
        );
        let query = AgentQuery::emergency(3);

        let outcome =
            tokio::time::timeout(Duration::from_millis(20), store.query_agents(&query)).await;
        assert!(outcome.is_err());
        assert_eq!(store.breaker().state(), CircuitState::Open);

        let err = store.query_agents(&query).await.unwrap_err();
        assert_eq!(err, StoreError::CircuitOpen);
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_passes_results_through() {
        let store = CircuitBreakerStore::new(
            FlakyStore {
                fail: false,
                delay: None,
                calls: AtomicUsize::new(0),
            },
            CircuitBreakerConfig::default(),
        )
        .with_timeout(Some(Duration::from_secs(5)));
        let agents = store
            .query_agents(&AgentQuery::emergency(3))
            .await
            .unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(store.breaker().state(), CircuitState::Closed);
    }
}
