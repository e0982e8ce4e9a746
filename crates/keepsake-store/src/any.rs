use std::path::Path;

use keepsake_template::Params;
use keepsake_types::{BackendKind, ResultHandle, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::local::LocalResultStore;
use crate::memory::InMemoryResultStore;
use crate::traits::ResultStore;

/// A result store whose backend is chosen at runtime.
///
/// `ResultStore` has generic methods and so cannot be used as a trait object;
/// this enum dispatches to the concrete backend instead.
#[derive(Debug)]
pub enum AnyResultStore {
    Local(LocalResultStore),
    Memory(InMemoryResultStore),
}

impl AnyResultStore {
    /// Open the backend named by `config.backend`.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            BackendKind::Local => Ok(Self::Local(LocalResultStore::from_config(config)?)),
            BackendKind::Memory => Ok(Self::Memory(InMemoryResultStore::with_options(
                config.options(),
            ))),
        }
    }
}

impl From<LocalResultStore> for AnyResultStore {
    fn from(store: LocalResultStore) -> Self {
        Self::Local(store)
    }
}

impl From<InMemoryResultStore> for AnyResultStore {
    fn from(store: InMemoryResultStore) -> Self {
        Self::Memory(store)
    }
}

impl ResultStore for AnyResultStore {
    fn backend(&self) -> BackendKind {
        match self {
            Self::Local(s) => s.backend(),
            Self::Memory(s) => s.backend(),
        }
    }

    fn root(&self) -> &Path {
        match self {
            Self::Local(s) => s.root(),
            Self::Memory(s) => s.root(),
        }
    }

    fn format<T>(&self, params: &Params) -> StoreResult<ResultHandle<T>> {
        match self {
            Self::Local(s) => s.format(params),
            Self::Memory(s) => s.format(params),
        }
    }

    fn write<T: Serialize>(&self, value: T, params: &Params) -> StoreResult<ResultHandle<T>> {
        match self {
            Self::Local(s) => s.write(value, params),
            Self::Memory(s) => s.write(value, params),
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> StoreResult<ResultHandle<T>> {
        match self {
            Self::Local(s) => s.read(key),
            Self::Memory(s) => s.read(key),
        }
    }

    fn exists(&self, key: &StorageKey) -> StoreResult<bool> {
        match self {
            Self::Local(s) => s.exists(key),
            Self::Memory(s) => s.exists(key),
        }
    }
}
