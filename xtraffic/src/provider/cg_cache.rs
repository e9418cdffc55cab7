//! CG lengths remembered per model string.
//!
//! Looking up a CG may cross into the model database or the simulator.
//! The cache is owned by the application and shared by all interpolators,
//! so a model's CG is resolved once per session.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Shared CG-by-model-string cache.
#[derive(Debug, Default)]
pub struct CgCache {
    entries: RwLock<HashMap<String, f64>>,
}

impl CgCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the CG of a model. Empty model strings are ignored.
    pub fn remember(&self, model_string: &str, cg_ft: f64) {
        let key = model_string.trim();
        if key.is_empty() || !cg_ft.is_finite() {
            return;
        }
        self.entries.write().insert(key.to_ascii_uppercase(), cg_ft);
    }

    /// CG of a model, if remembered.
    pub fn get(&self, model_string: &str) -> Option<f64> {
        let key = model_string.trim();
        if key.is_empty() {
            return None;
        }
        self.entries.read().get(&key.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_and_get_case_insensitive() {
        let cache = CgCache::new();
        cache.remember("A320 CFM", 9.5);
        assert_eq!(cache.get("a320 cfm"), Some(9.5));
        assert_eq!(cache.get("B738"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ignores_empty_and_non_finite() {
        let cache = CgCache::new();
        cache.remember("  ", 5.0);
        cache.remember("X", f64::NAN);
        assert!(cache.is_empty());
        assert_eq!(cache.get(""), None);
    }

    #[test]
    fn test_clear() {
        let cache = CgCache::new();
        cache.remember("B744", 16.0);
        cache.clear();
        assert!(cache.is_empty());
    }
}
