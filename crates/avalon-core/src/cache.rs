use std::{
    fs,
    path::{Path, PathBuf},
};

use avalon_utils::fs::{ensure_dir_exists, write_atomic};
use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    constants::{DOWNLOAD_URL, REMOTE_VERSION},
    error::{AvalonError, ErrorContext},
    AvalonResult,
};

/// Per-target key/value document persisted as pretty-printed JSON.
///
/// Every operation works on the whole document: `load` replaces the in-memory
/// view, `save` atomically overwrites the file.
#[derive(Debug, Clone)]
pub struct CacheDocument {
    path: PathBuf,
    data: Map<String, Value>,
}

impl CacheDocument {
    /// Opens the document at `path`, creating and persisting an empty one first when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> AvalonResult<Self> {
        let mut doc = Self {
            path: path.as_ref().to_path_buf(),
            data: Map::new(),
        };

        if doc.path.exists() {
            doc.load()?;
        } else {
            if let Some(parent) = doc.path.parent() {
                ensure_dir_exists(parent)?;
            }
            doc.save()?;
        }

        Ok(doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> AvalonResult<()> {
        let content = fs::read(&self.path)
            .with_context(|| format!("reading cache {}", self.path.display()))?;

        self.data = serde_json::from_slice(&content).map_err(|source| {
            AvalonError::Cache {
                path: self.path.clone(),
                source,
            }
        })?;
        trace!(path = %self.path.display(), keys = self.data.len(), "cache loaded");
        Ok(())
    }

    pub fn save(&self) -> AvalonResult<()> {
        let content = serde_json::to_vec_pretty(&self.data).map_err(|source| {
            AvalonError::Cache {
                path: self.path.clone(),
                source,
            }
        })?;
        write_atomic(&self.path, &content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value of `key`. `None` when absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn remote_version(&self) -> Option<&str> {
        self.get_str(REMOTE_VERSION)
    }

    pub fn download_url(&self) -> Option<&str> {
        self.get_str(DOWNLOAD_URL)
    }
}

/// Location of the cache document for `name` under `cache_root`.
pub fn cache_path(cache_root: &Path, name: &str) -> AvalonResult<PathBuf> {
    avalon_utils::path::join_component(
        cache_root,
        &format!("{name}.{}", crate::constants::CACHE_EXTENSION),
    )
    .ok_or_else(|| AvalonError::InvalidTargetName(name.to_string()))
}
