use serde_json::Number;
use thiserror::Error;

/// Structural problems with the score array. Any of these rejects the whole
/// submission; metadata problems never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("No values array provided")]
    MissingScores,

    #[error("Values must be an array, got {kind}")]
    NotAnArray { kind: &'static str },

    #[error("Incorrect number of value scores provided: {got}, expected {want}")]
    CountMismatch { got: usize, want: usize },

    #[error("Invalid type of value: {value} ({kind})")]
    TypeMismatch { value: String, kind: &'static str },

    #[error("Value ({value}) outside acceptable range (0-100)")]
    OutOfRange { value: Number },
}
