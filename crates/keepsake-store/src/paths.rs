//! Path expansion and containment checks.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Expand a leading `~` to the current user's home directory.
///
/// Only `~` and `~/...` are expanded; `~user` forms are returned unchanged.
pub fn expand_home(path: &Path) -> StoreResult<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == OsStr::new("~") => {
            let home = dirs::home_dir().ok_or(StoreError::NoHomeDirectory)?;
            let rest = components.as_path();
            if rest.as_os_str().is_empty() {
                Ok(home)
            } else {
                Ok(home.join(rest))
            }
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Absolute form of `path` with `.` and `..` removed lexically.
///
/// Symlinks are left alone and nothing needs to exist.
pub fn absolute(path: &Path) -> StoreResult<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Absolute form of `path` with symlinks, `.` and `..` resolved.
///
/// Components are applied one at a time and each existing prefix is
/// canonicalized before the next is applied, so `link/..` is the parent of
/// the link's target. Once a component does not exist the rest is applied
/// lexically.
pub fn normalize(path: &Path) -> StoreResult<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut resolved = PathBuf::new();
    let mut existing = true;

    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if existing {
                    match fs::canonicalize(&resolved) {
                        Ok(canonical) => resolved = canonical,
                        Err(_) => existing = false,
                    }
                }
            }
            other => {
                resolved.push(other.as_os_str());
                if existing {
                    if let Ok(canonical) = fs::canonicalize(&resolved) {
                        resolved = canonical;
                    }
                }
            }
        }
    }
    Ok(resolved)
}

/// `true` if `path` is `root` or lies beneath it.
///
/// Both sides are normalized first, so differently spelled paths to the same
/// place (`home/../home/x`, a symlink into `home`) compare equal.
pub fn is_within(path: &Path, root: &Path) -> StoreResult<bool> {
    Ok(normalize(path)?.starts_with(normalize(root)?))
}
