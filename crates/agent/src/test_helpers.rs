//! Call-counting stubs for the two remote collaborators.

use async_trait::async_trait;
use companion_core::error::{GenerationError, RetrievalError};
use companion_core::knowledge::{KnowledgeBase, RetrievalResult, RetrieveRequest};
use companion_core::runtime::{AgentRuntime, CompletionEvent, CompletionStream, InvokeAgentRequest};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted invocation: either the events to stream, or an error
/// returned before streaming starts.
pub type ScriptedInvocation = Result<Vec<Result<CompletionEvent, GenerationError>>, GenerationError>;

/// An agent runtime that plays back scripted invocations in order and
/// records every request it receives.
///
/// Panics if more calls are made than invocations were scripted.
pub struct ScriptedRuntime {
    script: Mutex<VecDeque<ScriptedInvocation>>,
    requests: Mutex<Vec<InvokeAgentRequest>>,
}

impl ScriptedRuntime {
    pub fn new(script: Vec<ScriptedInvocation>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Each text becomes one invocation that streams it as a single chunk.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(vec![Ok(CompletionEvent::chunk(t.as_bytes()))]))
                .collect(),
        )
    }

    /// A runtime that answers every call with the same text.
    pub fn repeating(text: &str, times: usize) -> Self {
        Self::texts(&vec![text; times])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<InvokeAgentRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The decoded `inputText` envelope of call `n`.
    pub fn envelope(&self, n: usize) -> serde_json::Value {
        serde_json::from_str(&self.requests.lock().unwrap()[n].input_text).unwrap()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke_agent(
        &self,
        request: InvokeAgentRequest,
    ) -> Result<CompletionStream, GenerationError> {
        let call = self.requests.lock().unwrap().len();
        self.requests.lock().unwrap().push(request);

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedRuntime: no invocation scripted for call #{call}"));

        let events = next?;
        let (tx, rx) = tokio::sync::mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        Ok(rx)
    }
}

/// A knowledge base returning a fixed result (or error) and counting calls.
pub struct StubKnowledgeBase {
    response: Result<Vec<RetrievalResult>, RetrievalError>,
    requests: Mutex<Vec<RetrieveRequest>>,
}

impl StubKnowledgeBase {
    pub fn new(response: Result<Vec<RetrievalResult>, RetrievalError>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn passages(texts: &[&str]) -> Self {
        Self::new(Ok(texts.iter().map(|t| RetrievalResult::text(*t)).collect()))
    }

    pub fn empty() -> Self {
        Self::new(Ok(Vec::new()))
    }

    pub fn failing(error: RetrievalError) -> Self {
        Self::new(Err(error))
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RetrieveRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeBase for StubKnowledgeBase {
    fn name(&self) -> &str {
        "stub"
    }

    async fn retrieve(
        &self,
        request: RetrieveRequest,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        self.requests.lock().unwrap().push(request);
        self.response.clone()
    }

    async fn probe(&self, query: &str) -> Result<serde_json::Value, RetrievalError> {
        let results = self.response.clone()?;
        Ok(serde_json::json!({ "query": query, "retrievalResults": results }))
    }
}
