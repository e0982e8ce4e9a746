//! Error types for template parsing and rendering.

use keepsake_types::KeyError;
use thiserror::Error;

/// Errors that can occur while parsing or rendering a key template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` was never closed.
    #[error("unclosed placeholder at position {0}")]
    Unclosed(usize),

    /// A `}` appeared without a matching `{` and was not escaped as `}}`.
    #[error("unmatched '}}' at position {0}")]
    UnmatchedClose(usize),

    /// `{}` with nothing inside.
    #[error("empty placeholder at position {0}")]
    EmptyPlaceholder(usize),

    /// The placeholder name contains characters outside the allowed set.
    #[error("invalid placeholder name {name:?} at position {position}")]
    InvalidName { name: String, position: usize },

    /// The template references a parameter that was not supplied.
    #[error("unresolved placeholder: {name}")]
    Unresolved { name: String },

    /// The rendered string is not a valid storage key.
    #[error("rendered key is invalid: {0}")]
    InvalidKey(#[from] KeyError),
}

pub type TemplateResult<T> = Result<T, TemplateError>;
