use thiserror::Error;

/// Errors from encoding or decoding a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The bytes are corrupt, truncated, or were written by another codec.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("unknown codec: {0}")]
    UnknownCodec(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
