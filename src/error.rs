//! Engine error taxonomy.
//!
//! Nothing here is fatal to the process: malformed NLU output and persistence
//! failures degrade to "no-op plus log" so the assistant stays responsive.
//! Duplicate entries and past-due suggestions are deliberately *not* errors;
//! they surface as clarifying prompts through dispatch outcomes.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside the engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The NLU collaborator produced output that is not a valid intent.
    /// Logged, no mutation, no user-visible response.
    #[error("malformed intent: {0}")]
    MalformedIntent(String),

    /// The durability flush failed. In-memory state remains authoritative
    /// for the session.
    #[error("persistence failure: {0}")]
    Persistence(#[from] std::io::Error),

    /// The memory document could not be encoded or decoded.
    #[error("memory encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl EngineError {
    /// Shorthand for intent-contract violations.
    pub fn malformed(reason: impl Into<String>) -> Self {
        EngineError::MalformedIntent(reason.into())
    }
}
