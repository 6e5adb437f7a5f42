//! Error types for quiz-core.

use thiserror::Error;

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while configuring or driving a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no cards available for this session")]
    EmptyCardSet,

    #[error("cannot {operation} while session is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}
