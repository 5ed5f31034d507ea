use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::{find_category, Category};

/// One level of the virtual folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub color: String,
}

impl From<&Category> for HierarchyEntry {
    fn from(category: &Category) -> Self {
        HierarchyEntry {
            category_id: category.category_id.clone(),
            category_name: category.category_name.clone(),
            color: category.color.clone(),
        }
    }
}

/// Ordered list of categories defining folder depth. Category ids are unique.
///
/// This type only maintains the list itself; resetting navigation and
/// invalidating cached structures on edits is the job of the
/// [`Organizer`](crate::Organizer) that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hierarchy {
    entries: Vec<HierarchyEntry>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Hierarchy::default()
    }

    /// Builds a hierarchy, keeping the first occurrence of each category id.
    pub fn from_entries(entries: impl IntoIterator<Item = HierarchyEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.category_id.clone());
                if !fresh {
                    debug!(category_id = %e.category_id, "Dropping duplicate hierarchy entry");
                }
                fresh
            })
            .collect();
        Hierarchy { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, depth: usize) -> Option<&HierarchyEntry> {
        self.entries.get(depth)
    }

    pub fn entries(&self) -> &[HierarchyEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HierarchyEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, category_id: &str) -> bool {
        self.position(category_id).is_some()
    }

    pub fn position(&self, category_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.category_id == category_id)
    }

    pub fn category_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.category_id.clone()).collect()
    }

    /// Appends `entry` unless its category is already present.
    pub(crate) fn push(&mut self, entry: HierarchyEntry) -> bool {
        if self.contains(&entry.category_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub(crate) fn remove(&mut self, category_id: &str) -> bool {
        match self.position(category_id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves the entry at `from` so that it ends up at index `to`.
    pub(crate) fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() || from == to {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Drops entries whose category no longer exists and refreshes the
    /// name and color of the rest. Returns the number of dropped entries.
    pub(crate) fn reconcile(&mut self, categories: &[Category]) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|entry| match find_category(categories, &entry.category_id) {
            Some(category) => {
                entry.category_name = category.category_name.clone();
                entry.color = category.color.clone();
                true
            }
            None => false,
        });
        before - self.entries.len()
    }
}

impl<'de> Deserialize<'de> for Hierarchy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<HierarchyEntry>::deserialize(deserializer)?;
        Ok(Hierarchy::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> HierarchyEntry {
        HierarchyEntry { category_id: id.into(), category_name: id.to_uppercase(), color: String::new() }
    }

    #[test]
    fn from_entries_deduplicates_by_category_id() {
        let mut first = entry("type");
        first.category_name = "First".into();
        let h = Hierarchy::from_entries(vec![first, entry("year"), entry("type")]);

        assert_eq!(h.category_ids(), vec!["type", "year"]);
        assert_eq!(h.get(0).unwrap().category_name, "First");
    }

    #[test]
    fn push_ignores_existing_category() {
        let mut h = Hierarchy::from_entries(vec![entry("type")]);
        assert!(!h.push(entry("type")));
        assert!(h.push(entry("year")));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn move_entry_reorders() {
        let mut h = Hierarchy::from_entries(vec![entry("a"), entry("b"), entry("c")]);
        assert!(h.move_entry(2, 0));
        assert_eq!(h.category_ids(), vec!["c", "a", "b"]);
        assert!(!h.move_entry(0, 3));
        assert!(!h.move_entry(1, 1));
    }

    #[test]
    fn reconcile_drops_unknown_and_refreshes_names() {
        let mut h = Hierarchy::from_entries(vec![entry("type"), entry("gone"), entry("year")]);
        let categories = vec![
            Category::new("type", "Document Type", "blue"),
            Category::new("year", "Year", "green"),
        ];

        assert_eq!(h.reconcile(&categories), 1);
        assert_eq!(h.category_ids(), vec!["type", "year"]);
        assert_eq!(h.get(0).unwrap().category_name, "Document Type");
        assert_eq!(h.get(1).unwrap().color, "green");
    }

    #[test]
    fn deserialization_deduplicates() {
        let json = r#"[{"categoryId":"a","categoryName":"A"},{"categoryId":"a","categoryName":"A2"}]"#;
        let h: Hierarchy = serde_json::from_str(json).unwrap();
        assert_eq!(h.len(), 1);
    }
}
