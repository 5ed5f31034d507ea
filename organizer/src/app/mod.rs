use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use organizer_core::category::find_category;
use organizer_core::{Category, Evidence, EvidenceSet, JsonFileStore, Organizer, OrganizerConfig, ViewMode};
use tokio::fs;
use tracing::{debug, warn};

/// A loaded browsing session: the organizer plus its inputs and settings store.
pub struct App {
    pub organizer: Organizer,
    pub evidence: EvidenceSet,
    store: JsonFileStore,
}

/// What [`App::show_in_folders`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The folder was entered.
    Entered { added_level: bool },
    /// The category is known but is not the next hierarchy level from here.
    NotReachable { added_level: bool },
    /// The category does not exist. Folder mode was still switched on.
    UnknownCategory,
}

impl App {
    pub async fn load(
        settings: &Path,
        categories: Option<&Path>,
        evidence: Option<&Path>,
        config: OrganizerConfig,
    ) -> Result<App> {
        let documents: Vec<Evidence> = match evidence {
            Some(path) => read_json(path).await?,
            None => Vec::new(),
        };
        let categories: Vec<Category> = match categories {
            Some(path) => read_json(path).await?,
            None => derive_categories(&documents),
        };
        debug!(documents = documents.len(), categories = categories.len(), "Inputs loaded");

        let store = JsonFileStore::open(settings)
            .await
            .with_context(|| format!("Failed to open settings file {}", settings.display()))?;
        let organizer = Organizer::load(categories, &store, config).await;

        Ok(App { organizer, evidence: EvidenceSet::new(documents), store })
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        find_category(self.organizer.categories(), category_id)
    }

    /// Enters `segments` in order. Segments that do not fit are skipped with a warning.
    pub fn enter_path(&mut self, segments: &[(String, String)]) -> usize {
        let mut entered = 0;
        for (category_id, tag_name) in segments {
            if self.organizer.navigate_to_folder(category_id, tag_name) {
                entered += 1;
            } else {
                let expected = self.organizer.next_category().map(|c| c.category_id.as_str());
                warn!(category_id, tag_name, ?expected, "Skipping path segment that does not match the hierarchy");
            }
        }
        entered
    }

    /// Reveals `tag_name` as a folder.
    ///
    /// Appends the category to the hierarchy if it is missing, switches to
    /// folder mode and navigates into the folder. An unknown category still
    /// switches the mode but leaves the path alone.
    pub fn show_in_folders(&mut self, category_id: &str, tag_name: &str) -> ShowOutcome {
        let Some(category) = self.category(category_id).cloned() else {
            warn!(category_id, "Cannot show unknown category in folders");
            self.organizer.set_view_mode(ViewMode::Folders);
            return ShowOutcome::UnknownCategory;
        };

        let added_level = if self.organizer.folder_hierarchy().contains(category_id) {
            false
        } else {
            self.organizer.add_to_hierarchy(&category)
        };
        self.organizer.set_view_mode(ViewMode::Folders);

        if self.organizer.navigate_to_folder(category_id, tag_name) {
            ShowOutcome::Entered { added_level }
        } else {
            ShowOutcome::NotReachable { added_level }
        }
    }

    /// Persists hierarchy and view mode if they changed.
    pub async fn save(&mut self) -> Result<()> {
        let written = self
            .organizer
            .save_settings(&self.store)
            .await
            .with_context(|| format!("Failed to write settings to {}", self.store.path().display()))?;
        if written {
            debug!("Settings saved");
        }
        Ok(())
    }
}

/// One category per tag key found in the documents, named after its id.
pub fn derive_categories(documents: &[Evidence]) -> Vec<Category> {
    let ids: BTreeSet<&str> = documents
        .iter()
        .flat_map(|d| d.tags.keys().map(String::as_str))
        .collect();
    ids.into_iter().map(|id| Category::new(id, id, "")).collect()
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
