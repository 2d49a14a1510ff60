//! Target registry
//!
//! Process-wide mapping from a user-chosen name to a target identity, used
//! to re-find a target across time without re-matching by URL. Entries
//! persist until explicitly removed; a registration whose target has since
//! been destroyed is a stale entry that matching treats as a miss.

use std::collections::HashMap;

/// Name -> target-id mapping
#[derive(Debug, Default)]
pub struct TargetRegistry {
    mappings: HashMap<String, String>,
}

impl TargetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the mapping for `name` (last write wins)
    pub fn set_mapping<S: Into<String>, T: Into<String>>(&mut self, name: S, target_id: T) {
        self.mappings.insert(name.into(), target_id.into());
    }

    /// Look up the target id stored under `name`; unknown names are `None`,
    /// never an error
    pub fn get_mapping(&self, name: &str) -> Option<&str> {
        self.mappings.get(name).map(String::as_str)
    }

    /// Remove the mapping for `name`; no-op when absent
    pub fn unregister(&mut self, name: &str) {
        self.mappings.remove(name);
    }

    /// Remove all mappings
    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    /// Number of stored mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the registry holds no mappings
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut registry = TargetRegistry::new();
        registry.set_mapping("checkout", "T1");
        assert_eq!(registry.get_mapping("checkout"), Some("T1"));
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = TargetRegistry::new();
        registry.set_mapping("checkout", "T1");
        registry.set_mapping("checkout", "T2");
        assert_eq!(registry.get_mapping("checkout"), Some("T2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let registry = TargetRegistry::new();
        assert_eq!(registry.get_mapping("nope"), None);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = TargetRegistry::new();
        registry.set_mapping("checkout", "T1");
        registry.unregister("checkout");
        assert_eq!(registry.get_mapping("checkout"), None);
        // Second removal of an absent entry is a no-op
        registry.unregister("checkout");
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut registry = TargetRegistry::new();
        registry.set_mapping("a", "T1");
        registry.set_mapping("b", "T2");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.get_mapping("a"), None);
        assert_eq!(registry.get_mapping("b"), None);
    }
}
