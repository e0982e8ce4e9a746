//! Root directory resolution.
//!
//! A store writes under exactly one root directory, fixed when the store is
//! opened. The root is chosen from an optional caller-supplied directory and
//! the configured home directory:
//!
//! 1. No directory supplied: `<home>/results`.
//! 2. A directory that is `<home>` or nested anywhere under it also collapses
//!    to `<home>/results`. Storage is never scattered across ad-hoc
//!    subdirectories of the managed home.
//! 3. Anything else is used as given.
//!
//! With validation on, the chosen path is made absolute (after `~`
//! expansion) and created if missing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::paths::{absolute, expand_home, is_within};

/// Name of the default root under the home directory.
pub const RESULTS_DIR: &str = "results";

/// Computes and validates store root directories for one home directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryResolver {
    home: PathBuf,
}

impl DirectoryResolver {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `<home>/results`, unexpanded.
    pub fn default_root(&self) -> PathBuf {
        self.home.join(RESULTS_DIR)
    }

    /// Choose the root for `requested` without creating anything.
    pub fn select(&self, requested: Option<&Path>) -> StoreResult<PathBuf> {
        let Some(requested) = requested else {
            return Ok(self.default_root());
        };

        let home = expand_home(&self.home)?;
        if is_within(&expand_home(requested)?, &home)? {
            debug!(
                requested = %requested.display(),
                home = %home.display(),
                "requested directory is inside home; using default root"
            );
            return Ok(self.default_root());
        }
        Ok(requested.to_path_buf())
    }

    /// Choose the root and, if `validate` is set, make it absolute and
    /// create it.
    ///
    /// Without validation the chosen path is returned exactly as selected;
    /// the caller must make sure it exists before writing.
    pub fn resolve(&self, requested: Option<&Path>, validate: bool) -> StoreResult<PathBuf> {
        let selected = self.select(requested)?;
        if !validate {
            return Ok(selected);
        }

        let root = absolute(&expand_home(&selected)?)?;
        ensure_directory(&root)?;
        Ok(root)
    }
}

/// Create `dir` (and parents) if missing and check it is a writable
/// directory.
///
/// An already existing directory is success, including one created
/// concurrently by another store.
pub fn ensure_directory(dir: &Path) -> StoreResult<()> {
    let directory_error = |source: io::Error| StoreError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(directory_error)?;
        info!(path = %dir.display(), "created result directory");
    }

    let meta = fs::metadata(dir).map_err(directory_error)?;
    if !meta.is_dir() {
        return Err(directory_error(io::Error::other("not a directory")));
    }
    tempfile::tempfile_in(dir).map_err(directory_error)?;
    Ok(())
}
