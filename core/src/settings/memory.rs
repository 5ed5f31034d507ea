use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Result, SettingsStore};

/// Volatile settings store, for tests and for hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
