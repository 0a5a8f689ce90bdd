//! Error types for the Student Companion domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Retrieval failures never
//! reach [`Error`]: the retrieval gateway absorbs them as "no material".

use thiserror::Error;

/// The top-level error type for all companion operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Student directory errors ---
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    // --- Generation service errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("Student not found: {0}")]
    NotFound(String),

    #[error("Duplicate student key: {0}")]
    DuplicateKey(String),

    #[error("Duplicate student id: {0}")]
    DuplicateId(String),

    #[error("Grade out of range for {student} / {subject}: {grade} (expected 0-100)")]
    GradeOutOfRange {
        student: String,
        subject: String,
        grade: u32,
    },
}

/// Failures talking to the remote generation (agent) service.
///
/// These are never recovered locally: they fail the current user action.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Agent request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Throttled by the agent service: {0}")]
    Throttled(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Agent service raised {exception_type}: {message}")]
    Service {
        exception_type: String,
        message: String,
    },

    #[error("Malformed agent response: {0}")]
    Malformed(String),
}

/// Failures talking to the remote knowledge-base search service.
///
/// The retrieval gateway absorbs these and reports "no material".
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Retrieve request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed retrieve response: {0}")]
    Malformed(String),
}
