//! Flag store trait and the in-memory backend.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::StoreError;

/// Get/set access to named boolean flags.
pub trait FlagStore: Send + Sync {
    /// Read a flag. Absent flags are `false`.
    fn get(&self, name: &str) -> Result<bool, StoreError>;

    /// Write a flag.
    fn set(&self, name: &str, value: bool) -> Result<(), StoreError>;

    /// Remove a flag entirely.
    fn clear(&self, name: &str) -> Result<(), StoreError>;
}

/// In-process flag store. Flags last as long as the process.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryFlagStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, bool>> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.lock().get(name).copied().unwrap_or(false))
    }

    fn set(&self, name: &str, value: bool) -> Result<(), StoreError> {
        self.lock().insert(name.to_string(), value);
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<(), StoreError> {
        self.lock().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flag_reads_false() {
        let store = MemoryFlagStore::new();
        assert!(!store.get("banner.dismissed").unwrap());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let store = MemoryFlagStore::new();
        store.set("banner.dismissed", true).unwrap();
        assert!(store.get("banner.dismissed").unwrap());

        store.set("banner.dismissed", false).unwrap();
        assert!(!store.get("banner.dismissed").unwrap());
    }

    #[test]
    fn clear_removes_only_the_named_flag() {
        let store = MemoryFlagStore::new();
        store.set("a", true).unwrap();
        store.set("b", true).unwrap();

        store.clear("a").unwrap();
        assert!(!store.get("a").unwrap());
        assert!(store.get("b").unwrap());

        // Clearing an absent flag is a no-op.
        store.clear("a").unwrap();
    }
}
