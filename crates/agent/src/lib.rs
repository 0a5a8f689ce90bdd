//! The Student Companion question pipeline.
//!
//! 1. **Retrieve** study material for the question from the knowledge base
//! 2. **Stop** with a fixed message if nothing was found
//! 3. **Profile** the student: one agent call over their subjects and grades
//! 4. **Answer**: one agent call grounded in the material and the profile
//!
//! Retrieval failures count as "nothing found". Generation failures fail the
//! request.

pub mod agent_gateway;
pub mod orchestrator;
pub mod prompts;
pub mod retrieval;

#[cfg(test)]
mod test_helpers;

pub use agent_gateway::AgentGateway;
pub use orchestrator::{AskResult, Companion, NOT_FOUND_MESSAGE, Outcome, Stage};
pub use prompts::{FullProfile, PromptPair};
pub use retrieval::{RetrievalGateway, RetrievedMaterial};
