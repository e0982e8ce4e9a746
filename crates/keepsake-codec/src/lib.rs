//! Serialization codecs for Keepsake result payloads.
//!
//! A codec turns a value into an opaque byte sequence and back. The store
//! never looks inside those bytes: whatever the codec produces is exactly
//! what lands on disk.
//!
//! - [`BincodeCodec`] -- compact binary encoding, the default
//! - [`JsonCodec`] -- human-readable JSON
//! - [`CodecKind`] -- configuration-selected codec that dispatches to either

pub mod codec;
pub mod error;

pub use codec::{BincodeCodec, Codec, CodecKind, JsonCodec};
pub use error::{CodecError, CodecResult};
