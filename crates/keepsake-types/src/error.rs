use thiserror::Error;

/// Errors produced when validating a storage key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("storage key must not be empty")]
    Empty,

    #[error("invalid storage key {key:?}: {reason}")]
    Invalid { key: String, reason: String },
}
