use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::key::StorageKey;

/// Identity of the backend a handle belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Files under a directory on the local filesystem.
    #[default]
    Local,
    /// Process-local map, for tests and embedding.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Lifecycle position of a [`ResultHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleState {
    /// No key rendered yet.
    Unresolved,
    /// Key rendered, nothing persisted: an address reserved ahead of a write.
    Formatted,
    /// Value persisted under the key.
    Written,
    /// Value loaded from an existing key.
    Read,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Formatted => write!(f, "formatted"),
            Self::Written => write!(f, "written"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// One stored or storable result.
///
/// Handles are immutable values. Every transition consumes the handle and
/// returns a new one carrying the same root and backend, so a handle given
/// to a caller is never changed behind its back.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultHandle<T> {
    value: Option<T>,
    key: Option<StorageKey>,
    root: PathBuf,
    backend: BackendKind,
    state: HandleState,
}

impl<T> ResultHandle<T> {
    /// Create an unresolved handle bound to `root`.
    pub fn new(root: impl Into<PathBuf>, backend: BackendKind) -> Self {
        Self {
            value: None,
            key: None,
            root: root.into(),
            backend,
            state: HandleState::Unresolved,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn key(&self) -> Option<&StorageKey> {
        self.key.as_ref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    /// `true` once the key exists on the backing medium.
    pub fn is_materialized(&self) -> bool {
        matches!(self.state, HandleState::Written | HandleState::Read)
    }

    /// Where the key lands under the root, if a key has been rendered.
    pub fn location(&self) -> Option<PathBuf> {
        self.key.as_ref().map(|key| key.to_path(&self.root))
    }

    /// The `(backend, key)` pair a run-state record keeps, if a key exists.
    pub fn reference(&self) -> Option<HandleRef> {
        self.key.as_ref().map(|key| HandleRef {
            backend: self.backend,
            key: key.clone(),
        })
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Replace the payload, possibly changing its type. Key, root and
    /// backend carry over.
    ///
    /// The new payload has not been persisted, so a Written or Read handle
    /// drops back to Formatted.
    pub fn with_value<U>(self, value: U) -> ResultHandle<U> {
        let state = match self.state {
            HandleState::Written | HandleState::Read => HandleState::Formatted,
            state => state,
        };
        ResultHandle {
            value: Some(value),
            key: self.key,
            root: self.root,
            backend: self.backend,
            state,
        }
    }

    /// Drop the payload, keeping everything else.
    pub fn without_value<U>(self) -> ResultHandle<U> {
        ResultHandle {
            value: None,
            key: self.key,
            root: self.root,
            backend: self.backend,
            state: self.state,
        }
    }

    /// Reserve `key` without persisting anything.
    pub fn formatted(self, key: StorageKey) -> Self {
        Self {
            key: Some(key),
            state: HandleState::Formatted,
            ..self
        }
    }

    /// Record that `value` has been persisted under `key`.
    pub fn written<U>(self, key: StorageKey, value: U) -> ResultHandle<U> {
        ResultHandle {
            value: Some(value),
            key: Some(key),
            root: self.root,
            backend: self.backend,
            state: HandleState::Written,
        }
    }

    /// Record that `value` was loaded from `key`.
    pub fn loaded<U>(self, key: StorageKey, value: U) -> ResultHandle<U> {
        ResultHandle {
            value: Some(value),
            key: Some(key),
            root: self.root,
            backend: self.backend,
            state: HandleState::Read,
        }
    }
}

/// Serializable pointer to a stored result.
///
/// This is all the run-state layer ever keeps: it later asks the backend
/// named here to `read` the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleRef {
    pub backend: BackendKind,
    pub key: StorageKey,
}

impl fmt::Display for HandleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.key)
    }
}
