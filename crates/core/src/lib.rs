//! # Companion Core
//!
//! Domain types, collaborator traits, and error definitions for the Student
//! Companion. The remote generation and search services are modelled as
//! traits here; AWS SDK implementations live in `companion-providers`, and the
//! pipeline that drives them lives in `companion-agent`.

pub mod directory;
pub mod error;
pub mod knowledge;
pub mod runtime;
pub mod student;

pub use directory::{DirectoryEntry, SelectorEntry, StudentDirectory};
pub use error::{DirectoryError, Error, GenerationError, RetrievalError};
pub use knowledge::{KnowledgeBase, RetrievalContent, RetrievalResult, RetrieveRequest};
pub use runtime::{AgentRuntime, CompletionEvent, CompletionStream, InvokeAgentRequest, SessionId};
pub use student::{AcademicDetails, LearningStyle, StudentRecord, Subject};
