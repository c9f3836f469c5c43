//! Persistent key/value storage.
//!
//! Stands in for browser local storage: a flat JSON object of string keys to
//! string values in `<home>/storage.json`, written with restricted
//! permissions (0600). Every mutation rewrites the whole file once, via a
//! temp file + rename, so multi-key updates land together.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::paths;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens the storage file at the default location.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(paths::storage_path()?))
    }

    /// Opens the storage file at `path`.
    ///
    /// A missing file is empty storage. An unreadable or malformed file is
    /// logged and also treated as empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding malformed storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "storage file unreadable");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets every pair, then writes once.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written. In-memory entries are
    /// left untouched in that case.
    pub fn set_many(&mut self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut next = self.entries.clone();
        for (key, value) in pairs {
            next.insert((*key).to_string(), (*value).to_string());
        }
        self.commit(next)
    }

    /// Removes every key, then writes once. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn remove_many(&mut self, keys: &[&str]) -> Result<bool> {
        let mut next = self.entries.clone();
        let mut removed = false;
        for key in keys {
            removed |= next.remove(*key).is_some();
        }
        if removed {
            self.commit(next)?;
        }
        Ok(removed)
    }

    fn commit(&mut self, next: BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(&next).context("Failed to serialize storage")?;
        write_atomic(&self.path, &contents)?;
        self.entries = next;
        Ok(())
    }
}

/// Replaces `path` with `contents` through a temp file in the same
/// directory, so readers see either the old file or the new one. The file
/// is readable by its owner only.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
