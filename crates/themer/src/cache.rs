//! Discovery cache artifact.
//!
//! A cache is a JSON file holding every discovered [`ThemeRecord`], written by
//! [`ThemeCache::write`] and loaded verbatim by [`ThemeCache::load`]. Loading a
//! cache skips directory scanning and descriptor parsing entirely; the records
//! are trusted as written, so stale caches must be rebuilt or cleared.
//!
//! ```json
//! {
//!   "version": 1,
//!   "themes": [ { "name": "Dark", "slug": "dark", ... } ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discovery::{ThemeScanner, ThemeSource};
use crate::error::{Result, ThemeError};
use crate::fs::Filesystem;
use crate::theme::ThemeRecord;

/// Format version written into new cache files.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    themes: Vec<ThemeRecord>,
}

/// Reads and writes the cache artifact at a fixed location.
pub struct ThemeCache<'a> {
    path: PathBuf,
    fs: &'a dyn Filesystem,
}

impl<'a> ThemeCache<'a> {
    pub fn new(path: impl Into<PathBuf>, fs: &'a dyn Filesystem) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.is_file(&self.path)
    }

    /// Loads the cached records in their original order.
    ///
    /// # Errors
    ///
    /// [`ThemeError::Cache`] if the file cannot be read, is not valid JSON or
    /// was written in an unknown format version.
    pub fn load(&self) -> Result<Vec<ThemeRecord>> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| self.error(e.to_string()))?;
        let file: CacheFile =
            serde_json::from_str(&content).map_err(|e| self.error(e.to_string()))?;

        if file.version != CACHE_FORMAT_VERSION {
            return Err(self.error(format!(
                "unsupported cache version {} (expected {})",
                file.version, CACHE_FORMAT_VERSION
            )));
        }

        debug!(path = %self.path.display(), count = file.themes.len(), "read theme cache");
        Ok(file.themes)
    }

    /// Writes `themes` to the cache, creating parent directories as needed.
    pub fn write<'t>(&self, themes: impl IntoIterator<Item = &'t ThemeRecord>) -> Result<usize> {
        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            themes: themes.into_iter().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| self.error(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| ThemeError::io(parent, e))?;
        }
        self.fs
            .write(&self.path, &json)
            .map_err(|e| ThemeError::io(&self.path, e))?;

        info!(path = %self.path.display(), count = file.themes.len(), "wrote theme cache");
        Ok(file.themes.len())
    }

    /// Runs a fresh scan of `sources` and writes the result.
    ///
    /// The existing cache is never consulted. Returns the cached records.
    pub fn build(&self, filename: &str, sources: &[ThemeSource]) -> Result<Vec<Arc<ThemeRecord>>> {
        let (themes, _skipped) = ThemeScanner::new(self.fs, filename).scan(sources)?;
        self.write(&themes)?;
        Ok(themes.into_iter().map(Arc::new).collect())
    }

    /// Deletes the cache file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        self.fs
            .remove_file(&self.path)
            .map_err(|e| ThemeError::io(&self.path, e))?;
        info!(path = %self.path.display(), "cleared theme cache");
        Ok(true)
    }

    fn error(&self, message: String) -> ThemeError {
        ThemeError::Cache {
            path: self.path.clone(),
            message,
        }
    }
}
