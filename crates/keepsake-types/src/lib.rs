//! Foundation types for Keepsake.
//!
//! This crate provides the addressing and handle types shared by every
//! Keepsake crate. Every other Keepsake crate depends on `keepsake-types`.
//!
//! # Key Types
//!
//! - [`StorageKey`] -- Validated relative address of a stored result
//! - [`ResultHandle`] -- Immutable value pairing an optional payload with its key and root
//! - [`HandleState`] -- Where a handle sits in the format/write/read lifecycle
//! - [`BackendKind`] -- Identity of the backend that produced a handle
//! - [`HandleRef`] -- The serializable `(backend, key)` pair handed to run-state records

pub mod error;
pub mod handle;
pub mod key;

pub use error::KeyError;
pub use handle::{BackendKind, HandleRef, HandleState, ResultHandle};
pub use key::{validate_key, StorageKey};
