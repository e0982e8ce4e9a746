use std::io;
use std::path::PathBuf;

use keepsake_codec::CodecError;
use keepsake_template::TemplateError;
use keepsake_types::{KeyError, StorageKey};

/// Errors from result store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored at the requested key.
    #[error("result not found: {key}")]
    NotFound { key: StorageKey },

    /// The key template could not be rendered.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A caller-supplied key is not a valid storage key.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// The handle has no key to read or check.
    #[error("handle has no storage key")]
    MissingKey,

    /// The value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stored bytes could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The root directory could not be created or is unusable.
    #[error("result directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `~` was used but no home directory is known for this user.
    #[error("home directory could not be determined")]
    NoHomeDirectory,

    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Serialization(msg) => Self::Serialization(msg),
            CodecError::Deserialization(msg) => Self::Deserialization(msg),
            CodecError::UnknownCodec(name) => Self::Config(format!("unknown codec: {name}")),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
