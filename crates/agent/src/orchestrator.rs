//! The question pipeline.
//!
//! ```text
//! AwaitingQuestion -> Retrieving -> NoMaterialFound
//!                                -> Answering -> Done
//! ```
//!
//! Retrieval runs first. Without material the pipeline stops and the agent
//! is never called. With material, the profile stage and the grounded-answer
//! stage each make one agent call. Generation failures end the request.

use companion_config::AppConfig;
use companion_core::directory::StudentDirectory;
use companion_core::error::{Error, GenerationError};
use companion_core::knowledge::KnowledgeBase;
use companion_core::runtime::AgentRuntime;
use companion_core::student::StudentRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::agent_gateway::AgentGateway;
use crate::prompts::{self, FullProfile};
use crate::retrieval::{RetrievalGateway, RetrievedMaterial};

/// Shown when the knowledge base has nothing for the question.
pub const NOT_FOUND_MESSAGE: &str =
    "I could not find any relevant information in the Knowledge Base for your question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AwaitingQuestion,
    Retrieving,
    NoMaterialFound,
    Answering,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Normal terminal outcome, not an error.
    NoMaterialFound { message: String },
    /// The generated answer and the raw material it was grounded in.
    Answered { answer: String, material: String },
}

/// Result of one question.
#[derive(Debug, Clone)]
pub struct AskResult {
    pub outcome: Outcome,
    /// Stages visited, in order.
    pub stages: Vec<Stage>,
}

impl AskResult {
    pub fn final_stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::AwaitingQuestion)
    }
}

/// Student Companion: directory plus both gateways.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct Companion {
    directory: Arc<StudentDirectory>,
    agent: AgentGateway,
    retrieval: RetrievalGateway,
}

impl Companion {
    pub fn new(
        directory: Arc<StudentDirectory>,
        agent: AgentGateway,
        retrieval: RetrievalGateway,
    ) -> Self {
        Self {
            directory,
            agent,
            retrieval,
        }
    }

    /// Wire both gateways with the configured generation and retrieval
    /// parameters.
    pub fn from_config(
        config: &AppConfig,
        directory: Arc<StudentDirectory>,
        runtime: Arc<dyn AgentRuntime>,
        knowledge_base: Arc<dyn KnowledgeBase>,
    ) -> Self {
        Self::new(
            directory,
            AgentGateway::from_config(runtime, &config.generation),
            RetrievalGateway::from_config(knowledge_base, &config.retrieval),
        )
    }

    pub fn directory(&self) -> &StudentDirectory {
        &self.directory
    }

    pub fn retrieval(&self) -> &RetrievalGateway {
        &self.retrieval
    }

    /// Profile stage: one agent call, combined with the record's fields.
    pub async fn build_full_profile(
        &self,
        student: &StudentRecord,
    ) -> Result<FullProfile, GenerationError> {
        let narrative = self.agent.invoke(&prompts::profile_prompt(student)).await?;
        debug!(student = %student.id, narrative_len = narrative.len(), "Profile generated");
        Ok(prompts::compose_full_profile(student, &narrative))
    }

    /// Answer `question` for the student under `student_key`.
    ///
    /// Fails with [`Error::Directory`] for an unknown key (before any remote
    /// call) and with [`Error::Generation`] when either agent call fails.
    pub async fn ask(&self, student_key: &str, question: &str) -> Result<AskResult, Error> {
        let student = self.directory.get(student_key)?;
        let mut stages = vec![Stage::AwaitingQuestion, Stage::Retrieving];

        info!(student = %student.id, "Retrieving material for question");

        let material = match self.retrieval.retrieve(question).await {
            RetrievedMaterial::Found(text) if !text.is_empty() => text,
            _ => {
                stages.push(Stage::NoMaterialFound);
                info!(student = %student.id, "No material found; skipping generation");
                return Ok(AskResult {
                    outcome: Outcome::NoMaterialFound {
                        message: NOT_FOUND_MESSAGE.to_string(),
                    },
                    stages,
                });
            }
        };

        stages.push(Stage::Answering);

        let profile = self.build_full_profile(student).await?;
        let prompt = prompts::answer_prompt(&profile, &material, question);
        let answer = self.agent.invoke(&prompt).await?;

        stages.push(Stage::Done);
        info!(student = %student.id, answer_len = answer.len(), "Question answered");

        Ok(AskResult {
            outcome: Outcome::Answered { answer, material },
            stages,
        })
    }
}
