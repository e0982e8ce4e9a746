use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use keepsake_codec::{Codec, CodecKind};
use keepsake_template::{KeyTemplate, Params};
use keepsake_types::{BackendKind, ResultHandle, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::{StoreConfig, StoreOptions};
use crate::error::{StoreError, StoreResult};
use crate::keys::render_key;
use crate::resolver::DirectoryResolver;
use crate::traits::ResultStore;

/// Result store backed by files under a local directory.
///
/// Each result is one file at `root/key` holding exactly the codec's bytes,
/// with no header or framing. Writes go to a temporary file next to the
/// destination and are renamed into place, so a reader sees either the old
/// object or the new one and the last completed write wins.
///
/// No locking is done around reads or writes. Concurrent writers to the same
/// key race at the filesystem level.
#[derive(Clone, Debug)]
pub struct LocalResultStore {
    root: PathBuf,
    template: Option<KeyTemplate>,
    codec: CodecKind,
}

impl LocalResultStore {
    /// Resolve the root for `options` and open a store on it.
    pub fn open(resolver: &DirectoryResolver, options: StoreOptions) -> StoreResult<Self> {
        let root = resolver.resolve(options.directory.as_deref(), options.validate_directory)?;
        debug!(root = %root.display(), codec = %options.codec, "opened local result store");
        Ok(Self {
            root,
            template: options.key_template,
            codec: options.codec,
        })
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.resolver(), config.options())
    }

    pub fn template(&self) -> Option<&KeyTemplate> {
        self.template.as_ref()
    }

    pub fn codec(&self) -> CodecKind {
        self.codec
    }

    /// A store on the same root with the same codec, rendering keys from
    /// `template`.
    pub fn with_template(&self, template: KeyTemplate) -> Self {
        Self {
            template: Some(template),
            ..self.clone()
        }
    }

    /// Filesystem path of `key`.
    pub fn path_of(&self, key: &StorageKey) -> PathBuf {
        key.to_path(&self.root)
    }

    fn persist(&self, key: &StorageKey, bytes: &[u8]) -> StoreResult<PathBuf> {
        let path = self.path_of(key);
        let parent = self.create_parents(key)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    /// Whether `err` from reading `key` only means no object is stored there:
    /// the file is missing, the key names a directory, or a key prefix is a
    /// regular file.
    fn is_absent(&self, key: &StorageKey, err: &io::Error) -> bool {
        if err.kind() == io::ErrorKind::NotFound {
            return true;
        }
        if fs::metadata(self.path_of(key)).is_ok_and(|meta| !meta.is_file()) {
            return true;
        }

        let components: Vec<&str> = key.components().collect();
        let mut prefix = self.root.clone();
        components[..components.len() - 1].iter().any(|component| {
            prefix.push(component);
            fs::metadata(&prefix).is_ok_and(|meta| !meta.is_dir())
        })
    }

    /// Create the directories for every key component but the last. The root
    /// itself is never created here.
    fn create_parents(&self, key: &StorageKey) -> StoreResult<PathBuf> {
        let components: Vec<&str> = key.components().collect();
        let mut dir = self.root.clone();
        for component in &components[..components.len() - 1] {
            dir.push(component);
            match fs::create_dir(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(dir)
    }
}

impl ResultStore for LocalResultStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn format<T>(&self, params: &Params) -> StoreResult<ResultHandle<T>> {
        let key = render_key(self.template.as_ref(), params)?;
        Ok(self.handle(None).formatted(key))
    }

    fn write<T: Serialize>(&self, value: T, params: &Params) -> StoreResult<ResultHandle<T>> {
        let handle: ResultHandle<T> = self.format(params)?;
        let key = handle.key().cloned().ok_or(StoreError::MissingKey)?;

        debug!(key = %key, "starting to write result");
        let bytes = self.codec.encode(&value)?;
        let path = self.persist(&key, &bytes)?;
        debug!(
            key = %key,
            path = %path.display(),
            bytes = bytes.len(),
            "finished writing result"
        );

        Ok(handle.written(key, value))
    }

    fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> StoreResult<ResultHandle<T>> {
        let path = self.path_of(key);
        debug!(key = %key, path = %path.display(), "starting to read result");

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if self.is_absent(key, &e) => {
                return Err(StoreError::NotFound { key: key.clone() })
            }
            Err(e) => return Err(e.into()),
        };
        let value: T = self.codec.decode(&bytes)?;
        debug!(key = %key, bytes = bytes.len(), "finished reading result");

        Ok(self.handle::<()>(None).loaded(key.clone(), value))
    }

    fn exists(&self, key: &StorageKey) -> StoreResult<bool> {
        match fs::metadata(self.path_of(key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                debug!(key = %key, error = %e, "result path unreadable; treating as absent");
                Ok(false)
            }
        }
    }
}
