use std::path::Path;

use keepsake_template::Params;
use keepsake_types::{BackendKind, ResultHandle, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Result store.
///
/// All implementations must satisfy these invariants:
/// - A key rendered from the same template and parameters is the same key,
///   so a re-run can find a prior result without having written it.
/// - `write` overwrites: the last completed write to a key wins.
/// - `read` of a missing key is [`StoreError::NotFound`], never a default value.
/// - `exists` never fails for a missing key; it returns `Ok(false)`.
/// - Every returned handle is new. No handle already given out is modified.
/// - The store never retries. All I/O errors are propagated.
pub trait ResultStore: Send + Sync {
    /// Identity carried by every handle this store produces.
    fn backend(&self) -> BackendKind;

    /// Root directory (or label, for non-filesystem backends) keys resolve under.
    fn root(&self) -> &Path;

    /// An unresolved handle bound to this store, optionally carrying an
    /// initial value.
    fn handle<T>(&self, value: Option<T>) -> ResultHandle<T> {
        let handle = ResultHandle::new(self.root(), self.backend());
        match value {
            Some(value) => handle.with_value(value),
            None => handle,
        }
    }

    /// Render the key for `params` without writing anything.
    fn format<T>(&self, params: &Params) -> StoreResult<ResultHandle<T>>;

    /// Encode `value` and persist it under the key rendered from `params`.
    fn write<T: Serialize>(&self, value: T, params: &Params) -> StoreResult<ResultHandle<T>>;

    /// Load and decode the value stored at `key`.
    fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> StoreResult<ResultHandle<T>>;

    /// Whether an object is present at `key`. Does not decode it.
    fn exists(&self, key: &StorageKey) -> StoreResult<bool>;

    /// Read using the key of a previously formatted or written handle.
    fn read_handle<T: DeserializeOwned, U>(
        &self,
        handle: &ResultHandle<U>,
    ) -> StoreResult<ResultHandle<T>> {
        let key = handle.key().ok_or(StoreError::MissingKey)?;
        self.read(key)
    }

    /// `exists` for a handle. A handle without a key exists nowhere.
    fn exists_handle<U>(&self, handle: &ResultHandle<U>) -> StoreResult<bool> {
        match handle.key() {
            Some(key) => self.exists(key),
            None => Ok(false),
        }
    }
}
