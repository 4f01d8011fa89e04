//! Hand-written port doubles shared by the use-case tests.

use crate::ports::agent_search::{AgentSearchPort, SearchError};
use crate::ports::agent_store::{AgentStorePort, StoreError};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use crate::ports::metrics::{MetricsSink, OperationRecord};
use async_trait::async_trait;
use panel_domain::{Agent, AgentQuery, Model, SearchHit, SearchHitMetadata, SearchRequest};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;

// ==================== LLM ====================

#[derive(Default)]
struct GatewayState {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    failing_system_prompts: Mutex<Vec<String>>,
    echo: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<(String, String)>>,
}

/// Scripted gateway.
///
/// Sessions pop queued replies in order. Once [`echoing`](Self::echoing), an
/// empty queue answers with the session's system prompt instead of failing.
pub(crate) struct MockGateway {
    state: Arc<GatewayState>,
}

impl MockGateway {
    pub(crate) fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            state: Arc::new(GatewayState {
                replies: Mutex::new(VecDeque::from(replies)),
                ..GatewayState::default()
            }),
        }
    }

    pub(crate) fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    /// Answer with the session's system prompt once the queue is drained
    pub(crate) fn echoing(self) -> Self {
        self.state.echo.store(true, Ordering::SeqCst);
        self
    }

    /// Every request sleeps for `delay` before answering
    pub(crate) fn delayed(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Sessions opened with this system prompt fail every request
    pub(crate) fn failing_for(self, system_prompt: &str) -> Self {
        self.state
            .failing_system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.to_string());
        self
    }

    /// `(system_prompt, content)` of every request sent
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.state.calls.lock().unwrap().clone()
    }
}

struct MockSession {
    model: Model,
    system_prompt: String,
    state: Arc<GatewayState>,
}

#[async_trait]
impl LlmSession for MockSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push((self.system_prompt.clone(), content.to_string()));

        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .state
            .failing_system_prompts
            .lock()
            .unwrap()
            .contains(&self.system_prompt)
        {
            return Err(GatewayError::RequestFailed("scripted failure".to_string()));
        }

        match self.state.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None if self.state.echo.load(Ordering::SeqCst) => {
                Ok(format!("Answer per {}", self.system_prompt))
            }
            None => Err(GatewayError::Other("No more responses".to_string())),
        }
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.create_session_with_system_prompt(model, "").await
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(MockSession {
            model: model.clone(),
            system_prompt: system_prompt.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

// ==================== Retrieval ====================

pub(crate) struct MockSearch {
    result: Result<Vec<SearchHit>, SearchError>,
    delay: Option<Duration>,
    pub(crate) calls: AtomicUsize,
}

impl MockSearch {
    pub(crate) fn returning(agents: Vec<Agent>) -> Self {
        let hits = agents
            .into_iter()
            .enumerate()
            .map(|(i, agent)| SearchHit {
                agent,
                similarity: 0.9 - i as f64 * 0.05,
                metadata: SearchHitMetadata {
                    graph_depth: Some(i as u32 + 1),
                },
            })
            .collect();
        Self {
            result: Ok(hits),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(error: SearchError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl AgentSearchPort for MockSearch {
    async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

pub(crate) struct MockStore {
    result: Result<Vec<Agent>, StoreError>,
    delay: Option<Duration>,
    queries: Mutex<Vec<AgentQuery>>,
}

impl MockStore {
    pub(crate) fn returning(agents: Vec<Agent>) -> Self {
        Self {
            result: Ok(agents),
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: StoreError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn queries(&self) -> Vec<AgentQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentStorePort for MockStore {
    async fn query_agents(&self, query: &AgentQuery) -> Result<Vec<Agent>, StoreError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
            .clone()
            .map(|agents| agents.into_iter().take(query.limit).collect())
    }
}

// ==================== Observability ====================

#[derive(Default)]
pub(crate) struct CapturingMetrics {
    records: Mutex<Vec<OperationRecord>>,
}

impl CapturingMetrics {
    pub(crate) fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl MetricsSink for CapturingMetrics {
    fn record(&self, record: OperationRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Log output captured while the guard returned by [`capture_logs`] lives
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing output into a buffer.
///
/// Works with `#[tokio::test]`, whose runtime polls everything on the test thread.
pub(crate) fn capture_logs() -> (DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    (tracing::subscriber::set_default(subscriber), buffer)
}

// ==================== Fixtures ====================

pub(crate) fn cardiology_expert() -> Agent {
    Agent::new("cardio", "cardiology-expert", 1)
        .with_display_name("Cardiology Expert")
        .with_description("Heart and blood vessel specialist")
        .with_system_prompt("You are a cardiologist.")
        .with_capabilities(["diagnosis", "treatment"])
        .with_domains(["cardiology"])
}

pub(crate) fn endocrinology_expert() -> Agent {
    Agent::new("endo", "endocrinology-expert", 2)
        .with_display_name("Endocrinology Expert")
        .with_description("Hormone and diabetes specialist")
        .with_system_prompt("You are an endocrinologist.")
        .with_capabilities(["diagnosis", "medication"])
        .with_domains(["endocrinology"])
}

pub(crate) fn general_practitioner() -> Agent {
    Agent::new("gp", "general-practitioner", 3)
        .with_display_name("General Practitioner")
        .with_description("Primary care for common conditions")
        .with_system_prompt("You are a general practitioner.")
        .with_domains(["general"])
}
