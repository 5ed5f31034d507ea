use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Tunables for an [`Organizer`](crate::Organizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizerConfig {
    /// Maximum number of memoized folder structures.
    pub cache_capacity: usize,
    /// Clear the navigation path when switching to the flat view.
    ///
    /// Off by default: the path is kept but ignored while flat, so switching
    /// back to folders resumes where the user left off.
    pub clear_path_on_flat: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        OrganizerConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            clear_path_on_flat: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: OrganizerConfig = serde_json::from_str(r#"{"clearPathOnFlat":true}"#).unwrap();
        assert!(config.clear_path_on_flat);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }
}
