//! Persistence of the organizer's configuration.
//!
//! Only two things are persisted: the folder hierarchy and the view mode.
//! Evidence and the navigation path are session state and never written.
//!
//! Values are stored as strings under fixed keys in an abstract
//! [`SettingsStore`], so the backend can be an in-memory map, a JSON file on
//! disk ([`JsonFileStore`]) or anything else that offers get/set of strings.
//!
//! Loading is forgiving: a missing key, an unparseable value or a failing
//! store all degrade to the defaults (empty hierarchy, flat view) and are
//! logged. Entries referring to categories that no longer exist are dropped.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::category::Category;
use crate::hierarchy::Hierarchy;
use crate::navigation::ViewMode;

mod file;
mod memory;

pub use self::file::JsonFileStore;
pub use self::memory::MemoryStore;

pub const HIERARCHY_KEY: &str = "organizer-folder-hierarchy";
pub const VIEW_MODE_KEY: &str = "organizer-display-mode";

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization/deserialization error")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// String key-value storage for persisted settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// The persisted part of the organizer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSettings {
    pub hierarchy: Hierarchy,
    pub view_mode: ViewMode,
}

impl PersistedSettings {
    /// Reads settings from `store`, validating the hierarchy against `categories`.
    ///
    /// Never fails; anything unusable falls back to the default.
    pub async fn load(store: &dyn SettingsStore, categories: &[Category]) -> Self {
        PersistedSettings::load_reconciled(store, categories).await.0
    }

    /// Like [`load`](PersistedSettings::load), also returning how many stored
    /// hierarchy entries were dropped because their category no longer exists.
    #[instrument(skip_all)]
    pub async fn load_reconciled(store: &dyn SettingsStore, categories: &[Category]) -> (Self, usize) {
        let mut hierarchy: Hierarchy = read_json(store, HIERARCHY_KEY).await.unwrap_or_default();
        let dropped = hierarchy.reconcile(categories);
        if dropped > 0 {
            warn!(dropped, "Dropped persisted hierarchy entries for unknown categories");
        }

        let view_mode = match read_raw(store, VIEW_MODE_KEY).await {
            Some(raw) => parse_view_mode(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Ignoring unparseable persisted view mode");
                ViewMode::default()
            }),
            None => ViewMode::default(),
        };

        debug!(depth = hierarchy.len(), %view_mode, "Loaded organizer settings");
        (PersistedSettings { hierarchy, view_mode }, dropped)
    }

    /// Writes both keys to `store`.
    #[instrument(skip_all)]
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        let hierarchy = serde_json::to_string(&self.hierarchy)?;
        store.set(HIERARCHY_KEY, hierarchy).await?;
        store.set(VIEW_MODE_KEY, self.view_mode.as_str().to_string()).await?;
        debug!("Organizer settings written");
        Ok(())
    }
}

async fn read_raw(store: &dyn SettingsStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!(key, "Failed to read setting, using default: {}", e);
            None
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, "Ignoring malformed persisted setting: {}", e);
            None
        }
    }
}

// Accepts both the bare form written by `save` and a JSON string literal.
fn parse_view_mode(raw: &str) -> Option<ViewMode> {
    raw.parse()
        .ok()
        .or_else(|| serde_json::from_str::<ViewMode>(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyEntry;

    fn categories() -> Vec<Category> {
        vec![Category::new("type", "Document Type", "blue"), Category::new("year", "Year", "green")]
    }

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        let settings = PersistedSettings::load(&store, &categories()).await;
        assert_eq!(settings, PersistedSettings::default());
    }

    #[tokio::test]
    async fn round_trips_through_store() {
        let store = MemoryStore::new();
        let settings = PersistedSettings {
            hierarchy: Hierarchy::from_entries(categories().iter().map(HierarchyEntry::from)),
            view_mode: ViewMode::Folders,
        };
        settings.save(&store).await.unwrap();

        assert_eq!(store.get(VIEW_MODE_KEY).await.unwrap().as_deref(), Some("folders"));
        assert_eq!(PersistedSettings::load(&store, &categories()).await, settings);
    }

    #[tokio::test]
    async fn malformed_values_fall_back() {
        let store = MemoryStore::new();
        store.set(HIERARCHY_KEY, "{not json".into()).await.unwrap();
        store.set(VIEW_MODE_KEY, "grid".into()).await.unwrap();

        let settings = PersistedSettings::load(&store, &categories()).await;
        assert!(settings.hierarchy.is_empty());
        assert_eq!(settings.view_mode, ViewMode::Flat);
    }

    #[tokio::test]
    async fn stale_categories_are_dropped() {
        let store = MemoryStore::new();
        let json = r#"[{"categoryId":"deleted","categoryName":"Old"},
                       {"categoryId":"year","categoryName":"Year (old name)"}]"#;
        store.set(HIERARCHY_KEY, json.into()).await.unwrap();
        store.set(VIEW_MODE_KEY, "\"folders\"".into()).await.unwrap();

        let (settings, dropped) = PersistedSettings::load_reconciled(&store, &categories()).await;
        assert_eq!(dropped, 1);
        assert_eq!(settings.hierarchy.category_ids(), vec!["year"]);
        assert_eq!(settings.hierarchy.get(0).unwrap().category_name, "Year");
        assert_eq!(settings.view_mode, ViewMode::Folders);
    }
}
