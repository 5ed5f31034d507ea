//! Virtual folder navigation over tagged documents.
//!
//! Documents ("evidence") stay in one flat collection. Each carries zero or
//! more tag values per [`Category`]. A user-chosen [`Hierarchy`] of categories
//! turns the collection into a browsable folder tree: the first level holds one
//! folder per value of the first category, entering a folder narrows the
//! documents to those holding that value, and so on down the hierarchy.
//!
//! # Core Concepts
//!
//! *   **[`Organizer`]:** the state container. Owns the hierarchy, the current
//!     [`NavigationPath`], the [`ViewMode`] and a [`StructureCache`]. All
//!     mutations go through it, and it announces them through
//!     [`OrganizerEvents`].
//! *   **[`EvidenceSet`]:** an immutable snapshot of the documents. The
//!     organizer never stores evidence; callers pass the current snapshot to
//!     each query.
//! *   **[`FolderNode`]:** one folder at the next level, with the number of
//!     distinct documents it contains. A document holding two values for a
//!     category appears in both folders.
//!
//! # Example
//!
//! ```rust
//! use organizer_core::{Category, Evidence, EvidenceSet, Organizer, ViewMode};
//!
//! let categories = vec![
//!     Category::new("type", "Document Type", "blue"),
//!     Category::new("year", "Year", "green"),
//! ];
//! let mut organizer = Organizer::new(categories.clone());
//! organizer.add_to_hierarchy(&categories[0]);
//! organizer.add_to_hierarchy(&categories[1]);
//! organizer.set_view_mode(ViewMode::Folders);
//!
//! let evidence = EvidenceSet::new(vec![
//!     Evidence::new("d1").with_tag("type", "Invoice").with_tag("year", "2024"),
//!     Evidence::new("d2").with_tag("type", "Receipt").with_tag("year", "2024"),
//! ]);
//!
//! let folders = organizer.generate_folder_structure(&evidence);
//! assert_eq!(folders[0].tag_name, "Invoice");
//!
//! organizer.navigate_to_folder("type", "Invoice");
//! assert_eq!(organizer.filter_evidence_by_path(&evidence).len(), 1);
//! ```

pub mod cache;
pub mod category;
pub mod config;
pub mod event;
pub mod evidence;
pub mod folders;
pub mod hierarchy;
pub mod navigation;
pub mod organizer;
pub mod settings;

pub use cache::{CacheStats, StructureCache};
pub use category::Category;
pub use config::OrganizerConfig;
pub use event::{HierarchyChanged, Listener, OrganizerEvents, PathChanged, ViewModeChanged};
pub use evidence::{Evidence, EvidenceSet, SnapshotToken, TagSet};
pub use folders::FolderNode;
pub use hierarchy::{Hierarchy, HierarchyEntry};
pub use navigation::{BreadcrumbItem, NavigationPath, PathSegment, ViewMode};
pub use organizer::Organizer;
pub use settings::{JsonFileStore, MemoryStore, PersistedSettings, SettingsStore};
