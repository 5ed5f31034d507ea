use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::trace;

use crate::evidence::{EvidenceSet, SnapshotToken};
use crate::folders::FolderNode;
use crate::hierarchy::Hierarchy;
use crate::navigation::NavigationPath;

pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Identifies one folder-structure computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructureKey {
    hierarchy: Vec<String>,
    path: Vec<(String, String)>,
    snapshot: SnapshotToken,
    len: usize,
}

impl StructureKey {
    pub fn new(hierarchy: &Hierarchy, path: &NavigationPath, evidence: &EvidenceSet) -> Self {
        StructureKey {
            hierarchy: hierarchy.category_ids(),
            path: path
                .segments()
                .iter()
                .map(|s| (s.category_id.clone(), s.tag_name.clone()))
                .collect(),
            snapshot: evidence.token(),
            len: evidence.len(),
        }
    }
}

/// Hit/miss counters, exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded memo of generated folder structures.
///
/// Path changes produce new keys, so older entries stay valid until evicted.
/// Hierarchy edits must call [`StructureCache::invalidate`].
#[derive(Debug)]
pub struct StructureCache {
    entries: LruCache<StructureKey, Arc<[FolderNode]>>,
    hits: u64,
    misses: u64,
}

impl StructureCache {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        StructureCache { entries: LruCache::new(capacity), hits: 0, misses: 0 }
    }

    /// Returns the cached structure for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: StructureKey, compute: F) -> Arc<[FolderNode]>
    where
        F: FnOnce() -> Vec<FolderNode>,
    {
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            trace!("Folder structure cache hit");
            return hit.clone();
        }
        self.misses += 1;
        let value: Arc<[FolderNode]> = compute().into();
        self.entries.put(key, value.clone());
        value
    }

    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            trace!(entries = self.entries.len(), "Invalidating folder structure cache");
        }
        self.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { hits: self.hits, misses: self.misses, entries: self.entries.len() }
    }
}

impl Default for StructureCache {
    fn default() -> Self {
        StructureCache::new(DEFAULT_CACHE_CAPACITY)
    }
}
