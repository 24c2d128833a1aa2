//! Error types for the banter library.

use thiserror::Error;

/// A turn-level failure.
///
/// Tool problems never appear here: they are fed back to the model as
/// result text. A turn either succeeds with assistant text or fails
/// atomically with one of these.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model provider could not be reached, authenticated against,
    /// or parsed
    #[error("Model unavailable: {0}")]
    Model(#[from] crate::llm::ModelError),
}
