//! Agent gateway: one stateless round trip to the remote agent.
//!
//! Every call gets a fresh session, sends a request envelope built from a
//! [`PromptPair`], and concatenates the streamed chunks in arrival order.

use companion_config::GenerationConfig;
use companion_core::error::GenerationError;
use companion_core::runtime::{AgentRuntime, InvokeAgentRequest, SessionId};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::prompts::PromptPair;

const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.9;

/// The JSON handed to the agent as its input text.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    system: &'a str,
    messages: [EnvelopeMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct EnvelopeMessage<'a> {
    role: &'static str,
    content: [EnvelopeText<'a>; 1],
}

#[derive(Debug, Serialize)]
struct EnvelopeText<'a> {
    text: &'a str,
}

pub struct AgentGateway {
    runtime: Arc<dyn AgentRuntime>,
    max_tokens: u32,
    temperature: f32,
}

impl AgentGateway {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn from_config(runtime: Arc<dyn AgentRuntime>, config: &GenerationConfig) -> Self {
        Self {
            runtime,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Serialize the request envelope for `prompt`.
    pub fn envelope(&self, prompt: &PromptPair) -> Result<String, GenerationError> {
        let envelope = Envelope {
            system: &prompt.system,
            messages: [EnvelopeMessage {
                role: "user",
                content: [EnvelopeText { text: &prompt.user }],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        serde_json::to_string(&envelope)
            .map_err(|e| GenerationError::Malformed(format!("request envelope: {e}")))
    }

    /// Invoke the agent and return its whole response, trimmed.
    ///
    /// Any failure, before or during streaming, is returned as is. Nothing
    /// is retried.
    pub async fn invoke(&self, prompt: &PromptPair) -> Result<String, GenerationError> {
        let session_id = SessionId::new();
        let input_text = self.envelope(prompt)?;

        debug!(
            runtime = self.runtime.name(),
            session_id = %session_id,
            input_len = input_text.len(),
            "Sending prompt to agent"
        );

        let mut stream = self
            .runtime
            .invoke_agent(InvokeAgentRequest {
                session_id,
                input_text,
            })
            .await?;

        // Fragments may split a multi-byte character; decode once at the end.
        let mut bytes = Vec::new();
        while let Some(event) = stream.recv().await {
            if let Some(chunk) = event?.chunk {
                bytes.extend_from_slice(&chunk);
            }
        }

        let text = String::from_utf8(bytes)
            .map_err(|e| GenerationError::Malformed(format!("response is not UTF-8: {e}")))?;

        debug!(response_len = text.len(), "Agent response complete");
        Ok(text.trim().to_string())
    }
}
