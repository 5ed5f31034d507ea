//! Path filtering and folder grouping.
//!
//! Both are pure functions over an evidence slice. A document may hold several
//! values for one category, so it can satisfy a path segment through any of
//! them and can appear, with full weight, in several sibling folders. The
//! hierarchy is a classification lens, not a partition.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::evidence::Evidence;
use crate::hierarchy::HierarchyEntry;
use crate::navigation::PathSegment;

/// A virtual folder at the next hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub tag_name: String,
    pub category_id: String,
    /// Number of distinct documents holding `tag_name`.
    pub file_count: usize,
}

/// Returns the documents that match every segment of `path`.
///
/// An empty path returns every document, in input order.
pub fn filter_by_path<'a>(path: &[PathSegment], evidence: &'a [Evidence]) -> Vec<&'a Evidence> {
    evidence
        .iter()
        .filter(|doc| path.iter().all(|s| doc.has_tag(&s.category_id, &s.tag_name)))
        .collect()
}

/// Groups `documents` by their values for `category`.
///
/// Single pass with a hash-map accumulator. Documents without a value for
/// the category land in no folder. The result is ordered by descending
/// `file_count`, ties by ascending `tag_name`.
pub fn group_by_category<'a>(
    documents: impl IntoIterator<Item = &'a Evidence>,
    category: &HierarchyEntry,
) -> Vec<FolderNode> {
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for doc in documents {
        // Values in a TagSet are already distinct, so each document counts once per folder.
        if let Some(values) = doc.tags.get(&category.category_id) {
            for value in values {
                *counts.entry(value.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut folders: Vec<FolderNode> = counts
        .into_iter()
        .map(|(tag_name, file_count)| FolderNode {
            tag_name: tag_name.to_string(),
            category_id: category.category_id.clone(),
            file_count,
        })
        .collect();
    folders.sort_by(compare_folders);
    folders
}

/// Counts documents that hold no value for `category_id`.
pub fn count_untagged<'a>(documents: impl IntoIterator<Item = &'a Evidence>, category_id: &str) -> usize {
    documents
        .into_iter()
        .filter(|doc| doc.tags_for(category_id).is_none())
        .count()
}

fn compare_folders(a: &FolderNode, b: &FolderNode) -> Ordering {
    b.file_count
        .cmp(&a.file_count)
        .then_with(|| a.tag_name.cmp(&b.tag_name))
}
