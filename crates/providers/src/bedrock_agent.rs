//! Agent runtime client for the Bedrock Agent Runtime `InvokeAgent` operation.
//!
//! The SDK signs the request and decodes the binary event stream. `chunk`
//! events carry the generated bytes; trace and other events arrive as empty
//! completion events; an exception event ends the stream with
//! [`GenerationError::Service`].

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::Client;
use aws_sdk_bedrockagentruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use companion_core::error::GenerationError;
use companion_core::runtime::*;
use tracing::{debug, trace, warn};

use crate::sdk;

/// Client for a single agent alias.
pub struct BedrockAgentRuntime {
    name: String,
    agent_id: String,
    agent_alias_id: String,
    // No operation timeout: a slow agent blocks the caller until it answers.
    client: Client,
}

impl BedrockAgentRuntime {
    pub fn new(
        client: Client,
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
    ) -> Self {
        Self {
            name: "bedrock-agent".into(),
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
            client,
        }
    }
}

fn completion_event(event: ResponseStream) -> CompletionEvent {
    match event {
        ResponseStream::Chunk(part) => {
            CompletionEvent::chunk(part.bytes().map(|b| b.as_ref().to_vec()).unwrap_or_default())
        }
        _ => {
            trace!("Ignoring non-chunk event");
            CompletionEvent::empty()
        }
    }
}

fn stream_error<E, R>(err: SdkError<E, R>) -> GenerationError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(context) => GenerationError::Service {
            exception_type: context
                .err()
                .code()
                .unwrap_or("UnknownException")
                .to_string(),
            message: context.err().message().unwrap_or_default().to_string(),
        },
        SdkError::ResponseError(_) => {
            GenerationError::Malformed(DisplayErrorContext(&err).to_string())
        }
        _ => GenerationError::StreamInterrupted(DisplayErrorContext(&err).to_string()),
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke_agent(
        &self,
        request: InvokeAgentRequest,
    ) -> std::result::Result<CompletionStream, GenerationError> {
        debug!(
            runtime = %self.name,
            agent_id = %self.agent_id,
            session_id = %request.session_id,
            "Invoking agent"
        );

        let output = self
            .client
            .invoke_agent()
            .agent_id(&self.agent_id)
            .agent_alias_id(&self.agent_alias_id)
            .session_id(request.session_id.as_str())
            .input_text(request.input_text)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %DisplayErrorContext(&e), "Agent invocation failed");
                GenerationError::from(sdk::classify(&e))
            })?;

        let mut completion = output.completion;
        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            loop {
                match completion.recv().await {
                    Ok(Some(event)) => {
                        if tx.send(Ok(completion_event(event))).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        let _ = tx.send(Err(stream_error(e))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
