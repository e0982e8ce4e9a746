//! Storage key validation.
//!
//! A storage key is the relative address of one stored result inside a
//! store's root directory. Keys are `/`-separated on every platform.
//!
//! Valid keys:
//! - Must be non-empty
//! - Must be relative: no leading `/` and no drive prefix such as `C:`
//! - Must not contain `\`, NUL, or any other control character
//! - Components between slashes must be non-empty
//! - No component may be `.` or `..`
//!
//! Together these rules guarantee a key can never address a file outside
//! the root it is joined onto.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// A validated, relative storage key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    /// Validate and wrap a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use keepsake_types::StorageKey;
    ///
    /// assert!(StorageKey::new("flows/etl/extract.bin").is_ok());
    /// assert!(StorageKey::new("../escape").is_err());
    /// assert!(StorageKey::new("/absolute").is_err());
    /// ```
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/`-separated components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The final component (the file name on disk).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Join this key onto `root`, one component at a time.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for component in self.components() {
            path.push(component);
        }
        path
    }

    /// Consume the key and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validate a storage key, returning `Ok(())` if valid.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    let invalid = |reason: &str| KeyError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if let Some(ch) = key.chars().find(|c| c.is_control()) {
        return Err(invalid(&format!("contains control character {ch:?}")));
    }

    if key.contains('\\') {
        return Err(invalid("must use '/' as the separator, not '\\'"));
    }

    if key.starts_with('/') {
        return Err(invalid("must be relative, not start with '/'"));
    }

    for component in key.split('/') {
        match component {
            "" => return Err(invalid("path components must not be empty")),
            "." | ".." => {
                return Err(invalid(&format!(
                    "component {component:?} is not allowed"
                )))
            }
            _ => {}
        }
    }

    // `C:` or `C:foo` as the first component would be a drive prefix on Windows.
    let first = key.split('/').next().unwrap_or_default();
    let mut chars = first.chars();
    if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
        if drive.is_ascii_alphabetic() {
            return Err(invalid("must not start with a drive prefix"));
        }
    }

    Ok(())
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({:?})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for StorageKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StorageKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_simple_keys() {
        assert!(validate_key("a").is_ok());
        assert!(validate_key("result.bin").is_ok());
        assert!(validate_key("2024-01-01T00:00:00").is_ok());
        assert!(validate_key(".hidden").is_ok());
    }

    #[test]
    fn valid_nested_keys() {
        assert!(validate_key("flows/etl/extract").is_ok());
        assert!(validate_key("a/b/c/d.prefect").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert_eq!(validate_key(""), Err(KeyError::Empty));
    }

    #[test]
    fn reject_absolute() {
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("C:/windows").is_err());
        assert!(validate_key("c:relative").is_err());
    }

    #[test]
    fn reject_traversal() {
        assert!(validate_key("..").is_err());
        assert!(validate_key("../outside").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("a/./b").is_err());
    }

    #[test]
    fn reject_empty_components() {
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("trailing/").is_err());
    }

    #[test]
    fn reject_backslash_and_control() {
        assert!(validate_key("a\\b").is_err());
        assert!(validate_key("a\0b").is_err());
        assert!(validate_key("line\nbreak").is_err());
    }

    #[test]
    fn colon_outside_drive_position_is_allowed() {
        assert!(validate_key("flow:run/task").is_ok());
        assert!(validate_key("ab:c").is_ok());
    }

    #[test]
    fn to_path_stays_under_root() {
        let root = Path::new("/srv/results");
        let key = StorageKey::new("flows/etl/out.bin").unwrap();
        let path = key.to_path(root);
        assert_eq!(path, PathBuf::from("/srv/results/flows/etl/out.bin"));
        assert_eq!(key.file_name(), "out.bin");
    }

    #[test]
    fn serde_rejects_invalid_keys() {
        let ok: StorageKey = serde_json::from_str("\"a/b\"").unwrap();
        assert_eq!(ok.as_str(), "a/b");
        assert!(serde_json::from_str::<StorageKey>("\"../x\"").is_err());
    }

    proptest! {
        #[test]
        fn valid_keys_never_escape_root(key in "[a-z0-9._-]{1,8}(/[a-z0-9._-]{1,8}){0,3}") {
            if let Ok(key) = StorageKey::new(key) {
                let root = Path::new("/root-dir");
                let path = key.to_path(root);
                prop_assert!(path.starts_with(root));
                prop_assert!(key.components().all(|c| c != ".." && c != "."));
            }
        }
    }
}
