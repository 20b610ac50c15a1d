//! File-backed flag store.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{FlagStore, StoreError};

/// Flag store backed by a flat JSON object on disk.
///
/// A missing file reads as "no flags". Each write rewrites the whole
/// map; the stores involved hold a handful of booleans.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    /// A store over the given file. The file and its parent directory
    /// are created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user cache directory.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("curtain")
            .join("flags.json")
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, bool>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn save(&self, flags: &HashMap<String, bool>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(flags)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.load()?.get(name).copied().unwrap_or(false))
    }

    fn set(&self, name: &str, value: bool) -> Result<(), StoreError> {
        let mut flags = self.load()?;
        flags.insert(name.to_string(), value);
        self.save(&flags)
    }

    fn clear(&self, name: &str) -> Result<(), StoreError> {
        let mut flags = self.load()?;
        if flags.remove(name).is_some() {
            self.save(&flags)?;
        }
        Ok(())
    }
}
