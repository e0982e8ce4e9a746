use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use keepsake_codec::{Codec, CodecKind};
use keepsake_template::{KeyTemplate, Params};
use keepsake_types::{BackendKind, ResultHandle, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::StoreOptions;
use crate::error::{StoreError, StoreResult};
use crate::keys::render_key;
use crate::traits::ResultStore;

/// Root label carried by handles from an [`InMemoryResultStore`].
pub const MEMORY_ROOT: &str = ":memory:";

/// In-memory, HashMap-based result store.
///
/// Intended for tests and embedding. Encoded objects are held behind a
/// `RwLock` for safe concurrent access, so values still pass through the
/// configured codec exactly as they would on disk.
pub struct InMemoryResultStore {
    objects: RwLock<HashMap<StorageKey, Vec<u8>>>,
    template: Option<KeyTemplate>,
    codec: CodecKind,
}

impl InMemoryResultStore {
    /// Create an empty store with no template and the default codec.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store using the template and codec from `options`.
    /// Directory options are ignored.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            template: options.key_template,
            codec: options.codec,
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total encoded bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|bytes| bytes.len() as u64)
            .sum()
    }

    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<StorageKey> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<StorageKey> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore for InMemoryResultStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn root(&self) -> &Path {
        Path::new(MEMORY_ROOT)
    }

    fn format<T>(&self, params: &Params) -> StoreResult<ResultHandle<T>> {
        let key = render_key(self.template.as_ref(), params)?;
        Ok(self.handle(None).formatted(key))
    }

    fn write<T: Serialize>(&self, value: T, params: &Params) -> StoreResult<ResultHandle<T>> {
        let handle: ResultHandle<T> = self.format(params)?;
        let key = handle.key().cloned().ok_or(StoreError::MissingKey)?;
        let bytes = self.codec.encode(&value)?;
        debug!(key = %key, bytes = bytes.len(), "writing result to memory");

        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(key.clone(), bytes);
        drop(map);

        Ok(handle.written(key, value))
    }

    fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> StoreResult<ResultHandle<T>> {
        let value: T = {
            let map = self.objects.read().expect("lock poisoned");
            let bytes = map
                .get(key)
                .ok_or_else(|| StoreError::NotFound { key: key.clone() })?;
            self.codec.decode(bytes)?
        };
        Ok(self.handle::<()>(None).loaded(key.clone(), value))
    }

    fn exists(&self, key: &StorageKey) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryResultStore")
            .field("object_count", &count)
            .field("template", &self.template)
            .field("codec", &self.codec)
            .finish()
    }
}
