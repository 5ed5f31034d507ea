use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::cache::{CacheStats, StructureCache, StructureKey};
use crate::category::Category;
use crate::config::OrganizerConfig;
use crate::event::{HierarchyChanged, OrganizerEvents, PathChanged, ViewModeChanged};
use crate::evidence::{Evidence, EvidenceSet};
use crate::folders::{self, FolderNode};
use crate::hierarchy::{Hierarchy, HierarchyEntry};
use crate::navigation::{BreadcrumbItem, NavigationPath, PathSegment, ViewMode};
use crate::settings::{self, PersistedSettings, SettingsStore};

/// Single state container for virtual folder browsing.
///
/// Hierarchy, path and view mode only change through `&mut self` methods, so
/// a hierarchy edit and the path reset it implies are always applied
/// together. Every effective change is announced through [`Organizer::on`];
/// no-ops are silent.
#[derive(Debug)]
pub struct Organizer {
    config: OrganizerConfig,
    categories: Vec<Category>,
    hierarchy: Hierarchy,
    path: NavigationPath,
    view_mode: ViewMode,
    cache: StructureCache,
    settings_dirty: bool,
    pub on: OrganizerEvents,
}

impl Organizer {
    pub fn new(categories: Vec<Category>) -> Self {
        Organizer::with_config(categories, OrganizerConfig::default())
    }

    pub fn with_config(categories: Vec<Category>, config: OrganizerConfig) -> Self {
        Organizer {
            cache: StructureCache::new(config.cache_capacity),
            config,
            categories,
            hierarchy: Hierarchy::new(),
            path: NavigationPath::new(),
            view_mode: ViewMode::default(),
            settings_dirty: false,
            on: OrganizerEvents::new(),
        }
    }

    /// Restores the persisted hierarchy and view mode from `store`.
    ///
    /// Never fails: unusable settings fall back to defaults.
    pub async fn load(categories: Vec<Category>, store: &dyn SettingsStore, config: OrganizerConfig) -> Self {
        let (persisted, dropped) = PersistedSettings::load_reconciled(store, &categories).await;
        let mut organizer = Organizer::with_config(categories, config);
        organizer.hierarchy = persisted.hierarchy;
        organizer.view_mode = persisted.view_mode;
        // Stale entries are still in the store until the next save.
        organizer.settings_dirty = dropped > 0;
        organizer
    }

    /// Writes hierarchy and view mode if either changed since the last load or save.
    ///
    /// Returns whether anything was written.
    #[instrument(skip_all)]
    pub async fn save_settings(&mut self, store: &dyn SettingsStore) -> settings::Result<bool> {
        if !self.settings_dirty {
            return Ok(false);
        }
        self.settings().save(store).await?;
        self.settings_dirty = false;
        Ok(true)
    }

    pub fn settings(&self) -> PersistedSettings {
        PersistedSettings { hierarchy: self.hierarchy.clone(), view_mode: self.view_mode }
    }

    pub fn has_unsaved_settings(&self) -> bool {
        self.settings_dirty
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Replaces the reference category list.
    ///
    /// Hierarchy entries for deleted categories are dropped, which resets the
    /// path like any other removal. Remaining entries take the new names and colors.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        let before = self.hierarchy.clone();
        let dropped = self.hierarchy.reconcile(&self.categories);
        if dropped > 0 {
            info!(dropped, "Removed hierarchy levels for deleted categories");
            self.after_hierarchy_edit(true);
        } else if before != self.hierarchy {
            // Renames only: structure is unchanged, so the path and cache stay valid.
            self.settings_dirty = true;
            self.emit_hierarchy_changed(false);
            if self.path.refresh_names(&self.hierarchy) {
                self.emit_path_changed();
            }
        }
    }

    // --- view mode ---

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_folder_mode(&self) -> bool {
        self.view_mode == ViewMode::Folders
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        let previous = std::mem::replace(&mut self.view_mode, mode);
        self.settings_dirty = true;
        debug!(%previous, current = %mode, "View mode changed");
        self.on.view_mode_changed.dispatch(&ViewModeChanged { previous, current: mode });

        if mode == ViewMode::Flat && self.config.clear_path_on_flat && self.path.clear() {
            self.emit_path_changed();
        }
    }

    // --- hierarchy ---

    pub fn folder_hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Replaces the hierarchy. Always returns to the root.
    pub fn set_hierarchy(&mut self, entries: impl IntoIterator<Item = HierarchyEntry>) {
        self.hierarchy = Hierarchy::from_entries(entries);
        self.after_hierarchy_edit(true);
    }

    pub fn clear_hierarchy(&mut self) {
        self.set_hierarchy(Vec::new());
    }

    /// Appends a level unless the category is already part of the hierarchy.
    ///
    /// Appending never invalidates the current path, so it is kept.
    pub fn add_to_hierarchy(&mut self, entry: impl Into<HierarchyEntry>) -> bool {
        let entry = entry.into();
        let category_id = entry.category_id.clone();
        if !self.hierarchy.push(entry) {
            debug!(%category_id, "Category already in hierarchy");
            return false;
        }
        debug!(%category_id, depth = self.hierarchy.len(), "Added hierarchy level");
        self.after_hierarchy_edit(false);
        true
    }

    /// Removes a level and returns to the root.
    pub fn remove_from_hierarchy(&mut self, category_id: &str) -> bool {
        if !self.hierarchy.remove(category_id) {
            debug!(category_id, "Category not in hierarchy");
            return false;
        }
        debug!(category_id, "Removed hierarchy level");
        self.after_hierarchy_edit(true);
        true
    }

    /// Moves the level at `from` to index `to` and returns to the root.
    pub fn move_in_hierarchy(&mut self, from: usize, to: usize) -> bool {
        if !self.hierarchy.move_entry(from, to) {
            return false;
        }
        self.after_hierarchy_edit(true);
        true
    }

    fn after_hierarchy_edit(&mut self, reset_path: bool) {
        self.cache.invalidate();
        self.settings_dirty = true;
        let path_cleared = reset_path && self.path.clear();
        self.emit_hierarchy_changed(reset_path);
        if path_cleared {
            self.emit_path_changed();
        }
    }

    // --- navigation ---

    pub fn current_path(&self) -> &[PathSegment] {
        self.path.segments()
    }

    pub fn breadcrumb_path(&self) -> Vec<BreadcrumbItem> {
        self.path.breadcrumbs()
    }

    pub fn is_at_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The category whose values form the folders at the current level, or
    /// `None` once the path has used up the hierarchy.
    pub fn next_category(&self) -> Option<&HierarchyEntry> {
        self.path.next_category(&self.hierarchy)
    }

    /// Enters the folder `tag_name` of the next hierarchy level.
    ///
    /// Returns `false` without changing anything if `category_id` is not the
    /// next level or the hierarchy is exhausted.
    pub fn navigate_to_folder(&mut self, category_id: &str, tag_name: &str) -> bool {
        if !self.path.push(&self.hierarchy, category_id, tag_name) {
            return false;
        }
        self.emit_path_changed();
        true
    }

    /// Goes back up so that `depth` selections remain.
    pub fn navigate_to_depth(&mut self, depth: usize) -> bool {
        if !self.path.truncate(depth) {
            debug!(depth, current = self.path.len(), "Ignoring navigation to depth");
            return false;
        }
        self.emit_path_changed();
        true
    }

    pub fn navigate_to_root(&mut self) {
        if self.path.clear() {
            self.emit_path_changed();
        }
    }

    // --- queries ---

    /// Documents matching every segment of the current path.
    pub fn filter_evidence_by_path<'a>(&self, evidence: &'a [Evidence]) -> Vec<&'a Evidence> {
        folders::filter_by_path(self.path.segments(), evidence)
    }

    /// Documents to list beside the folders: all of them while flat.
    pub fn visible_evidence<'a>(&self, evidence: &'a [Evidence]) -> Vec<&'a Evidence> {
        match self.view_mode {
            ViewMode::Flat => evidence.iter().collect(),
            ViewMode::Folders => self.filter_evidence_by_path(evidence),
        }
    }

    /// Folders at the current level with their document counts, memoized per
    /// hierarchy, path and evidence snapshot.
    pub fn generate_folder_structure(&mut self, evidence: &EvidenceSet) -> Arc<[FolderNode]> {
        let Some(next) = self.path.next_category(&self.hierarchy) else {
            return Arc::from(Vec::new());
        };
        let key = StructureKey::new(&self.hierarchy, &self.path, evidence);
        let path = self.path.segments();
        self.cache.get_or_insert_with(key, || {
            let filtered = folders::filter_by_path(path, evidence);
            folders::group_by_category(filtered, next)
        })
    }

    /// Documents on the current path with no value for the next category.
    ///
    /// These are in no folder at this level. Zero when the hierarchy is exhausted.
    pub fn unfoldered_count(&self, evidence: &[Evidence]) -> usize {
        match self.next_category() {
            Some(next) => folders::count_untagged(self.filter_evidence_by_path(evidence), &next.category_id),
            None => 0,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn emit_path_changed(&self) {
        debug!(depth = self.path.len(), "Navigation path changed");
        self.on.path_changed.dispatch(&PathChanged { path: self.path.segments().to_vec() });
    }

    fn emit_hierarchy_changed(&self, path_reset: bool) {
        self.on.hierarchy_changed.dispatch(&HierarchyChanged {
            hierarchy: self.hierarchy.entries().to_vec(),
            path_reset,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc as StdArc, Mutex};

    use super::*;
    use crate::event::Listener;
    use crate::settings::MemoryStore;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("type", "Document Type", "blue"),
            Category::new("year", "Year", "green"),
            Category::new("client", "Client", "red"),
        ]
    }

    fn organizer() -> Organizer {
        let mut org = Organizer::new(categories());
        for c in categories().iter().take(2) {
            org.add_to_hierarchy(c);
        }
        org.set_view_mode(ViewMode::Folders);
        org
    }

    fn evidence() -> EvidenceSet {
        EvidenceSet::new(vec![
            Evidence::new("d1").with_tag("type", "Invoice").with_tag("year", "2024"),
            Evidence::new("d2").with_tag("type", "Receipt").with_tag("year", "2024"),
            Evidence::new("d3").with_tag("type", "Invoice").with_tag("year", "2023"),
        ])
    }

    fn names(folders: &[FolderNode]) -> Vec<(&str, usize)> {
        folders.iter().map(|f| (f.tag_name.as_str(), f.file_count)).collect()
    }

    #[test]
    fn browses_type_then_year() {
        let mut org = organizer();
        let evidence = evidence();

        assert!(org.is_at_root());
        assert_eq!(org.next_category().unwrap().category_id, "type");
        assert_eq!(names(&org.generate_folder_structure(&evidence)), vec![("Invoice", 2), ("Receipt", 1)]);

        assert!(org.navigate_to_folder("type", "Invoice"));
        let ids: Vec<&str> = org.filter_evidence_by_path(&evidence).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d3"]);
        assert_eq!(names(&org.generate_folder_structure(&evidence)), vec![("2023", 1), ("2024", 1)]);

        assert!(org.navigate_to_folder("year", "2024"));
        assert!(org.next_category().is_none());
        assert!(org.generate_folder_structure(&evidence).is_empty());
        assert_eq!(org.filter_evidence_by_path(&evidence).len(), 1);
    }

    #[test]
    fn invalid_folder_navigation_is_ignored() {
        let mut org = organizer();
        assert!(!org.navigate_to_folder("year", "2024"));
        assert!(!org.navigate_to_folder("client", "Acme"));
        assert!(org.is_at_root());

        org.navigate_to_folder("type", "Invoice");
        org.navigate_to_folder("year", "2024");
        assert!(!org.navigate_to_folder("type", "Receipt"));
        assert_eq!(org.current_path().len(), 2);
    }

    #[test]
    fn navigate_to_depth_keeps_prefix() {
        let mut org = Organizer::new(categories());
        for c in &categories() {
            org.add_to_hierarchy(c);
        }
        org.navigate_to_folder("type", "Invoice");
        let first = org.current_path()[0].clone();
        org.navigate_to_folder("year", "2024");
        org.navigate_to_folder("client", "Acme");

        assert!(!org.navigate_to_depth(3));
        assert!(org.navigate_to_depth(1));
        assert_eq!(org.current_path(), &[first]);

        org.navigate_to_root();
        assert!(org.is_at_root());
        org.navigate_to_root();
        assert!(org.is_at_root());
    }

    #[test]
    fn hierarchy_edits_reset_path_except_append() {
        let mut org = organizer();
        org.navigate_to_folder("type", "Invoice");

        assert!(org.add_to_hierarchy(&categories()[2]));
        assert!(!org.add_to_hierarchy(&categories()[2]));
        assert_eq!(org.current_path().len(), 1);

        assert!(org.remove_from_hierarchy("client"));
        assert!(org.is_at_root());

        org.navigate_to_folder("type", "Invoice");
        assert!(org.move_in_hierarchy(1, 0));
        assert!(org.is_at_root());
        assert_eq!(org.folder_hierarchy().category_ids(), vec!["year", "type"]);

        org.navigate_to_folder("year", "2024");
        org.set_hierarchy(org.folder_hierarchy().entries().to_vec());
        assert!(org.is_at_root());
    }

    #[test]
    fn removing_only_level_empties_everything() {
        let mut org = Organizer::new(categories());
        org.add_to_hierarchy(&categories()[0]);
        org.navigate_to_folder("type", "Invoice");

        assert!(org.remove_from_hierarchy("type"));
        assert!(org.folder_hierarchy().is_empty());
        assert!(org.current_path().is_empty());
        assert!(!org.remove_from_hierarchy("type"));
    }

    #[test]
    fn hierarchy_edit_invalidates_cache() {
        let mut org = organizer();
        let evidence = evidence();
        org.generate_folder_structure(&evidence);
        org.generate_folder_structure(&evidence);
        assert_eq!(org.cache_stats().hits, 1);

        org.add_to_hierarchy(&categories()[2]);
        assert_eq!(org.cache_stats().entries, 0);
        org.generate_folder_structure(&evidence);
        assert_eq!(org.cache_stats().misses, 2);
    }

    #[test]
    fn new_snapshot_misses_cache() {
        let mut org = organizer();
        let before = org.generate_folder_structure(&evidence());

        let mut docs = evidence().to_vec();
        docs.push(Evidence::new("d4").with_tag("type", "Receipt"));
        let after = org.generate_folder_structure(&EvidenceSet::new(docs));

        assert_eq!(names(&before), vec![("Invoice", 2), ("Receipt", 1)]);
        assert_eq!(names(&after), vec![("Invoice", 2), ("Receipt", 2)]);
    }

    #[test]
    fn flat_mode_keeps_path_by_default() {
        let mut org = organizer();
        let evidence = evidence();
        org.navigate_to_folder("type", "Receipt");

        org.set_view_mode(ViewMode::Flat);
        assert!(!org.is_folder_mode());
        assert_eq!(org.current_path().len(), 1);
        assert_eq!(org.visible_evidence(&evidence).len(), 3);

        org.set_view_mode(ViewMode::Folders);
        assert_eq!(org.visible_evidence(&evidence).len(), 1);
    }

    #[test]
    fn flat_mode_can_clear_path() {
        let config = OrganizerConfig { clear_path_on_flat: true, ..Default::default() };
        let mut org = Organizer::with_config(categories(), config);
        org.add_to_hierarchy(&categories()[0]);
        org.set_view_mode(ViewMode::Folders);
        org.navigate_to_folder("type", "Receipt");

        org.set_view_mode(ViewMode::Flat);
        assert!(org.is_at_root());
    }

    #[test]
    fn unfoldered_count_reports_untagged_documents() {
        let mut org = organizer();
        let mut docs = evidence().to_vec();
        docs.push(Evidence::new("d4").with_tag("type", "Invoice"));

        assert_eq!(org.unfoldered_count(&docs), 0);
        org.navigate_to_folder("type", "Invoice");
        assert_eq!(org.unfoldered_count(&docs), 1);
        org.navigate_to_folder("year", "2024");
        assert_eq!(org.unfoldered_count(&docs), 0);
    }

    #[test]
    fn set_categories_drops_deleted_levels() {
        let mut org = organizer();
        org.navigate_to_folder("type", "Invoice");

        let mut renamed = categories();
        renamed[0].category_name = "Kind".into();
        org.set_categories(renamed);
        assert_eq!(org.folder_hierarchy().get(0).unwrap().category_name, "Kind");
        assert_eq!(org.current_path().len(), 1);
        assert_eq!(org.current_path()[0].category_name, "Kind");
        assert_eq!(org.breadcrumb_path()[0].category_name, "Kind");

        org.set_categories(vec![Category::new("year", "Year", "green")]);
        assert_eq!(org.folder_hierarchy().category_ids(), vec!["year"]);
        assert!(org.is_at_root());
    }

    #[test]
    fn events_fire_on_effective_changes_only() {
        let mut org = organizer();
        let log = StdArc::new(Mutex::new(Vec::<String>::new()));

        let l = log.clone();
        let _path = Listener::new(&org.on.path_changed, move |e: &PathChanged| {
            l.lock().unwrap().push(format!("path:{}", e.path.len()));
        });
        let l = log.clone();
        let _hierarchy = Listener::new(&org.on.hierarchy_changed, move |e: &HierarchyChanged| {
            l.lock().unwrap().push(format!("hierarchy:{}:{}", e.hierarchy.len(), e.path_reset));
        });

        org.navigate_to_folder("type", "Invoice");
        org.navigate_to_folder("client", "Acme");
        org.navigate_to_depth(5);
        org.remove_from_hierarchy("year");
        org.navigate_to_root();

        assert_eq!(*log.lock().unwrap(), vec!["path:1", "hierarchy:1:true", "path:0"]);
    }

    #[tokio::test]
    async fn settings_persist_when_dirty() {
        let store = MemoryStore::new();
        let mut org = organizer();
        assert!(org.save_settings(&store).await.unwrap());
        assert!(!org.save_settings(&store).await.unwrap());

        org.navigate_to_folder("type", "Invoice");
        assert!(!org.has_unsaved_settings(), "path is not persisted");

        let restored = Organizer::load(categories(), &store, OrganizerConfig::default()).await;
        assert_eq!(restored.folder_hierarchy(), org.folder_hierarchy());
        assert!(restored.is_folder_mode());
        assert!(restored.is_at_root());
        assert!(!restored.has_unsaved_settings());
    }

    #[tokio::test]
    async fn stale_persisted_levels_are_rewritten() {
        let store = MemoryStore::new();
        let mut org = organizer();
        org.add_to_hierarchy(&categories()[2]);
        org.save_settings(&store).await.unwrap();

        let remaining: Vec<Category> = categories().into_iter().take(2).collect();
        let mut restored = Organizer::load(remaining.clone(), &store, OrganizerConfig::default()).await;
        assert!(restored.has_unsaved_settings());
        assert!(restored.save_settings(&store).await.unwrap());

        let stored = store.get(crate::settings::HIERARCHY_KEY).await.unwrap().unwrap();
        assert!(!stored.contains("client"));
        let again = Organizer::load(remaining, &store, OrganizerConfig::default()).await;
        assert!(!again.has_unsaved_settings());
        assert_eq!(again.folder_hierarchy().category_ids(), vec!["type", "year"]);
    }
}
