//! File-based fragment cache: one file per fragment and flavour.
//!
//! Layout under the cache root:
//!
//! ```text
//! _core.js  _core.min.js
//! s3.js     s3.min.js
//! s3-2006-03-01.js  s3-2006-03-01.min.js
//! ```
//!
//! Entries are never mutated or evicted here. Writes go through a temp file
//! and a rename, so concurrent readers never observe a partial fragment and
//! racing writers of the same key (which produce identical bytes) are
//! harmless.

use sdkpack_core::error::CacheError;
use sdkpack_core::fragment::FragmentId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A cache rooted at one directory (one per SDK library version).
#[derive(Debug, Clone)]
pub struct FragmentCache {
    root: PathBuf,
}

impl FragmentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a fragment's cache file.
    pub fn path_for(&self, id: &FragmentId, minified: bool) -> PathBuf {
        self.root.join(id.file_name(minified))
    }

    /// Create the root directory. Succeeds if it already exists.
    pub async fn ensure_root(&self) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_error(&self.root, e))
    }

    pub async fn exists(&self, id: &FragmentId, minified: bool) -> bool {
        tokio::fs::try_exists(self.path_for(id, minified))
            .await
            .unwrap_or(false)
    }

    /// Read a fragment. A missing file is [`CacheError::NotFound`].
    pub async fn read(&self, id: &FragmentId, minified: bool) -> Result<String, CacheError> {
        let path = self.path_for(id, minified);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(fragment = %id, minified, "Cache hit");
                Ok(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(fragment = %id, minified, "Cache miss");
                Err(CacheError::NotFound(id.file_name(minified)))
            }
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    /// Persist a fragment atomically.
    pub async fn write(&self, id: &FragmentId, minified: bool, text: &str) -> Result<(), CacheError> {
        self.ensure_root().await?;

        let path = self.path_for(id, minified);
        let tmp = self
            .root
            .join(format!(".{}.tmp-{}", id.file_name(minified), Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp, text).await {
            return Err(storage_error(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_error(&path, e));
        }

        debug!(fragment = %id, minified, bytes = text.len(), "Fragment cached");
        Ok(())
    }

    /// Every fragment file under the root, sorted. A missing root is empty.
    pub async fn entries(&self) -> Result<Vec<(FragmentId, bool)>, CacheError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error(&self.root, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| storage_error(&self.root, e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 cache file name");
                continue;
            };
            if let Some(parsed) = FragmentId::parse_file_name(name) {
                entries.push(parsed);
            }
        }

        entries.sort();
        Ok(entries)
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> CacheError {
    CacheError::Storage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
