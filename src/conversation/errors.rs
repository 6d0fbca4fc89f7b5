//! Error types for the conversation engine.

use thiserror::Error;

/// Conversation engine error type.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result alias for conversation operations.
pub type ConversationResult<T> = Result<T, ConversationError>;
