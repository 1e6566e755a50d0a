//! Error types for the assistant.

use civica_core::error::CivicaError;

use crate::types::TurnState;

/// Errors from the assistant engine.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant is disabled")]
    Disabled,
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("unknown intent category: {0}")]
    UnknownCategory(String),
    #[error("response generation failed: {0}")]
    ResponseGeneration(String),
    #[error("invalid turn transition: {0} -> {1}")]
    InvalidTransition(TurnState, TurnState),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CivicaError> for AssistantError {
    fn from(err: CivicaError) -> Self {
        AssistantError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Serialization(err.to_string())
    }
}
