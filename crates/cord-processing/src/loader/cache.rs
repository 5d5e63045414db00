//! Opt-in memoization of loaded files.
//!
//! A [`LoadCache`] is owned by whoever calls the loader (a dashboard session,
//! a long-running CLI loop). Entries are keyed by canonical path and
//! invalidated when the file's modification time changes. Nothing is cached
//! unless the caller goes through a cache instance.

use super::load_path;
use crate::error::LoadError;
use crate::types::RecordTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    modified: SystemTime,
    table: RecordTable,
}

/// Caller-owned cache of loaded tables.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<PathBuf, CacheEntry>,
    hits: usize,
    misses: usize,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it if it is not cached
    /// or the file changed since it was cached.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<RecordTable, LoadError> {
        let path = path.as_ref();
        let (key, modified) = file_identity(path)?;

        if let Some(entry) = self.entries.get(&key)
            && entry.modified == modified
        {
            self.hits += 1;
            debug!("Load cache hit: {}", key.display());
            return Ok(entry.table.clone());
        }

        self.misses += 1;
        debug!("Load cache miss: {}", key.display());

        let table = load_path(&key)?;
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        let key = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of lookups that had to read the file.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

/// Canonical path and modification time of `path`.
fn file_identity(path: &Path) -> Result<(PathBuf, SystemTime), LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let canonical = path.canonicalize().map_err(io_err)?;
    let modified = std::fs::metadata(&canonical)
        .and_then(|meta| meta.modified())
        .map_err(io_err)?;

    Ok((canonical, modified))
}
