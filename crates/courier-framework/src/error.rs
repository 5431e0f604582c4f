//! Error types for the Courier framework.

use thiserror::Error;

/// Errors that can occur during context extraction.
///
/// A failed extraction fails the handler: the dispatcher reports it as a
/// handler error rather than skipping the entry.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The update does not carry the payload the extractor needs.
    #[error("payload mismatch: expected {expected}, got {got}")]
    PayloadMismatch {
        /// Payload the extractor wanted.
        expected: &'static str,
        /// Category of the update being dispatched.
        got: &'static str,
    },

    /// The update is not a chat-member update, so no transition was derived.
    #[error("no chat-member transition in this context")]
    MissingTransition,

    /// No command matched this update.
    #[error("no parsed command in this context; register the handler with `command(..)`")]
    MissingCommand,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
