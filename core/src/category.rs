use serde::{Deserialize, Serialize};

/// A classification axis (e.g. "Document Type") supplied by the category service.
///
/// The organizer treats categories as read-only reference data: it looks them up
/// to validate persisted hierarchies and to label folders, but never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
    /// Presentation token (e.g. `"blue"` or `"#3f51b5"`), passed through untouched.
    #[serde(default)]
    pub color: String,
}

impl Category {
    pub fn new(
        category_id: impl Into<String>,
        category_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Category {
            category_id: category_id.into(),
            category_name: category_name.into(),
            color: color.into(),
        }
    }
}

/// Looks up a category by id.
pub fn find_category<'a>(categories: &'a [Category], category_id: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.category_id == category_id)
}
