//! Error types for the core library.

use thiserror::Error;

use crate::rule::{Field, Predicate, ValidationError};

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The rule source contained an invalid rule.
    #[error("Invalid rule set: {0}")]
    Validation(#[from] ValidationError),

    /// A condition could not be evaluated.
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A concurrent processing task panicked or was aborted.
    #[error("Task failed: {0}")]
    Task(String),
}

/// Errors raised while evaluating a condition.
///
/// A validated rule set never produces these; seeing one means a rule was
/// built without going through the rule store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The predicate cannot be applied to the field's kind of value.
    #[error("predicate '{}' cannot be applied to field '{}'", predicate.as_str(), field.as_str())]
    TypeMismatch {
        /// Field the condition targets.
        field: Field,
        /// Predicate the condition uses.
        predicate: Predicate,
    },

    /// A date predicate carried a threshold that is not a non-negative integer.
    #[error("invalid date threshold '{0}'")]
    InvalidThreshold(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
