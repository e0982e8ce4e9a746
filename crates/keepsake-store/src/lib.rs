//! Result storage for Keepsake.
//!
//! A result store persists the output of a unit of work so a later run can
//! find it again by key instead of recomputing it. Keys are rendered from a
//! [`KeyTemplate`] and run parameters; values are encoded by a configured
//! codec and written as opaque bytes.
//!
//! # Storage Backends
//!
//! All backends implement the [`ResultStore`] trait:
//!
//! - [`LocalResultStore`] -- one file per key under a root directory
//! - [`InMemoryResultStore`] -- `HashMap`-based store for tests and embedding
//! - [`AnyResultStore`] -- backend chosen from [`StoreConfig`] at runtime
//!
//! # Design Rules
//!
//! 1. The root directory is fixed when a store is opened.
//! 2. A directory at or under the home directory collapses to `<home>/results`.
//! 3. Keys are pure functions of template and parameters.
//! 4. Writes overwrite; the last completed write wins.
//! 5. The store never interprets object contents.
//! 6. All I/O errors are propagated, never retried or silently ignored.

pub mod any;
pub mod config;
pub mod error;
mod keys;
pub mod local;
pub mod memory;
pub mod paths;
pub mod resolver;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use any::AnyResultStore;
pub use config::{StoreConfig, StoreOptions, HOME_ENV};
pub use error::{StoreError, StoreResult};
pub use keys::GENERATED_KEY_PREFIX;
pub use local::LocalResultStore;
pub use memory::{InMemoryResultStore, MEMORY_ROOT};
pub use resolver::{DirectoryResolver, RESULTS_DIR};
pub use traits::ResultStore;

pub use keepsake_codec::CodecKind;
pub use keepsake_template::{KeyTemplate, Params};
pub use keepsake_types::{BackendKind, HandleRef, HandleState, ResultHandle, StorageKey};
