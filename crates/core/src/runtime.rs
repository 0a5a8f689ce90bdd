//! Agent runtime trait: the abstraction over the remote generation service.
//!
//! An agent runtime accepts an opaque input text for a given session and
//! answers with a stream of completion events. Implementations: the
//! Bedrock SDK client in `companion-providers`, and call-counting
//! stubs in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::GenerationError;

/// Per-call session identifier. A fresh one is generated for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single invocation of the remote agent.
#[derive(Debug, Clone)]
pub struct InvokeAgentRequest {
    pub session_id: SessionId,

    /// Serialized request envelope handed to the agent verbatim.
    pub input_text: String,
}

/// One event of a streamed completion.
///
/// Only events that carry a `chunk` contribute text; other event kinds
/// (traces, attributions) arrive with `chunk: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionEvent {
    pub chunk: Option<Vec<u8>>,
}

impl CompletionEvent {
    pub fn chunk(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            chunk: Some(bytes.into()),
        }
    }

    pub fn empty() -> Self {
        Self { chunk: None }
    }
}

/// Receiving half of a completion stream.
pub type CompletionStream =
    tokio::sync::mpsc::Receiver<std::result::Result<CompletionEvent, GenerationError>>;

/// The remote generation service.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// A human-readable name for this runtime (e.g. "bedrock-agent").
    fn name(&self) -> &str;

    /// Start an invocation and return its event stream.
    ///
    /// Events are delivered in the order the service produced them.
    async fn invoke_agent(
        &self,
        request: InvokeAgentRequest,
    ) -> std::result::Result<CompletionStream, GenerationError>;
}
