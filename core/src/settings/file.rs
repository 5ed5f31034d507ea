use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{Error, Result, SettingsStore};

/// Settings persisted as one JSON object of string values.
///
/// The file is read once on [`open`](JsonFileStore::open) and rewritten in
/// full on every `set`. A missing file is treated as empty; so is a file that
/// does not parse, which gets overwritten by the next `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path).await {
            Ok(content) => match serde_json::from_slice(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Settings file is malformed, starting empty: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(JsonFileStore { path, values: Mutex::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content).await?;
        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.lock().await;
        if values.get(key) == Some(&value) {
            return Ok(());
        }
        // The map mirrors the file; it only changes once the write went through.
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        self.flush(&updated).await?;
        *values = updated;
        Ok(())
    }
}
