//! Key-value persistence seam.
//!
//! Collections are stored whole: one key per collection, the value is its
//! JSON document, rewritten on every mutation.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key holding the full workout session list
pub const SESSIONS_KEY: &str = "fitness-workouts";
/// Key holding the full goal list
pub const GOALS_KEY: &str = "fitness-goals";

/// Durable string-to-string storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
