use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::hierarchy::{Hierarchy, HierarchyEntry};

/// How documents are presented: one flat list, or virtual folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Flat,
    Folders,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Flat => "flat",
            ViewMode::Folders => "folders",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown view mode '{0}' (expected 'flat' or 'folders')")]
pub struct ParseViewModeError(pub String);

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "flat" => Ok(ViewMode::Flat),
            "folders" => Ok(ViewMode::Folders),
            other => Err(ParseViewModeError(other.to_string())),
        }
    }
}

/// One folder selection on the navigation path.
///
/// `depth` is the index into the hierarchy at which the selection was made,
/// so `path[i].category_id == hierarchy[i].category_id` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub category_id: String,
    pub category_name: String,
    pub tag_name: String,
    pub depth: usize,
}

/// Presentation view of a path segment. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbItem {
    pub title: String,
    pub category_id: String,
    pub category_name: String,
    pub depth: usize,
    pub is_last: bool,
    pub disabled: bool,
    pub clickable: bool,
}

/// The user's current sequence of folder selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationPath {
    segments: Vec<PathSegment>,
}

impl NavigationPath {
    pub fn new() -> Self {
        NavigationPath::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The hierarchy level that the next folder selection would consume.
    pub fn next_category<'h>(&self, hierarchy: &'h Hierarchy) -> Option<&'h HierarchyEntry> {
        hierarchy.get(self.segments.len())
    }

    /// Appends a selection if `category_id` is the next level of `hierarchy`.
    pub(crate) fn push(&mut self, hierarchy: &Hierarchy, category_id: &str, tag_name: &str) -> bool {
        let depth = self.segments.len();
        let Some(next) = hierarchy.get(depth) else {
            debug!(depth, category_id, "Hierarchy exhausted; ignoring folder navigation");
            return false;
        };
        if next.category_id != category_id {
            debug!(
                depth,
                expected = %next.category_id,
                category_id,
                "Category does not match next hierarchy level; ignoring folder navigation"
            );
            return false;
        }
        self.segments.push(PathSegment {
            category_id: next.category_id.clone(),
            category_name: next.category_name.clone(),
            tag_name: tag_name.to_string(),
            depth,
        });
        true
    }

    /// Keeps the first `depth` segments. Navigating forward is not possible this way.
    pub(crate) fn truncate(&mut self, depth: usize) -> bool {
        if depth >= self.segments.len() {
            return false;
        }
        self.segments.truncate(depth);
        true
    }

    pub(crate) fn clear(&mut self) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        self.segments.clear();
        true
    }

    /// Picks up renamed categories from `hierarchy`. Returns whether any name changed.
    pub(crate) fn refresh_names(&mut self, hierarchy: &Hierarchy) -> bool {
        let mut changed = false;
        for segment in &mut self.segments {
            if let Some(entry) = hierarchy.get(segment.depth) {
                if entry.category_name != segment.category_name {
                    segment.category_name = entry.category_name.clone();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Derives breadcrumb items; the last one is the current, non-clickable folder.
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbItem> {
        let last_depth = self.segments.len().checked_sub(1);
        self.segments
            .iter()
            .map(|s| {
                let is_last = Some(s.depth) == last_depth;
                BreadcrumbItem {
                    title: s.tag_name.clone(),
                    category_id: s.category_id.clone(),
                    category_name: s.category_name.clone(),
                    depth: s.depth,
                    is_last,
                    disabled: is_last,
                    clickable: !is_last,
                }
            })
            .collect()
    }
}
