//! Flat-file persistence for cache entries.
//!
//! Every entry lives in one file directly under the store root, named by its
//! cache key (identity digest and structural hash concatenated as hex, no
//! separator, no extension). Writes are whole-file with no locking: two
//! processes racing on the same key compute identical results, so the last
//! writer wins and a reader that catches a truncated file falls back to the
//! corruption-recovery path.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CacheError;

/// Access rights applied to new entry files: group/world read-write, so a
/// shared cache directory stays usable across user accounts.
const ENTRY_FILE_MODE: u32 = 0o666;

/// Filesystem half of the cache engine: maps keys to paths and performs the
/// blocking whole-file I/O.
pub struct EntryStore {
    /// Root directory holding one file per entry.
    directory: PathBuf,
}

impl EntryStore {
    /// Opens a store rooted at `directory`, creating it if absent.
    ///
    /// A freshly created root is relaxed to `dir_mode` (bypassing the
    /// process umask) so other users can share the cache; failure to relax
    /// is ignored, failure to create is an error.
    pub fn create(directory: &Path, dir_mode: u32) -> Result<Self, CacheError> {
        if !directory.exists() {
            std::fs::create_dir_all(directory).map_err(|e| CacheError::Io {
                path: directory.to_path_buf(),
                source: e,
            })?;
            set_mode(directory, dir_mode);
        }
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    /// Returns the store root.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file path for an entry with the given key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(key)
    }

    /// Returns `true` if an entry file exists for the key.
    pub fn exists(&self, key: &str) -> bool {
        let path = self.path_for(key);
        debug!(path = %path.display(), "cache probe");
        path.exists()
    }

    /// Reads an entry file whole.
    pub fn read(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.path_for(key);
        std::fs::read(&path).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Writes an entry file whole, then relaxes its access rights.
    ///
    /// No rename, no lock: the collision model makes last-writer-wins
    /// acceptable. Permission relaxation failures are ignored.
    pub fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        std::fs::write(&path, bytes).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        set_mode(&path, ENTRY_FILE_MODE);
        Ok(())
    }

    /// Removes an entry file (corruption recovery).
    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        std::fs::remove_file(&path).map_err(|e| CacheError::Io { path, source: e })
    }
}

/// Best-effort permission change; errors are ignored.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}
