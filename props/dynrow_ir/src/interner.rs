//! Shared string interner for property and class names.
//!
//! Interning gives O(1) name comparison and cheap map hashing. Backing
//! strings are leaked: a registry lives for the process, so its names do
//! too, and lookups hand out `&'static str` without copying.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::Name;

#[derive(Default)]
struct InternerState {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<&'static str>,
}

/// Thread-safe shared interner.
///
/// One interner is created per root class and cloned down the hierarchy, so
/// every class in a chain resolves the same `Name` to the same string.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<RwLock<InternerState>>);

impl SharedInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its stable identifier.
    pub fn intern(&self, text: &str) -> Name {
        if let Some(&idx) = self.0.read().map.get(text) {
            return Name::from_raw(idx);
        }
        let mut state = self.0.write();
        // Re-check under the write lock: another thread may have raced us.
        if let Some(&idx) = state.map.get(text) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        // Registries hold tens of names; u32 is not a practical limit.
        let idx = u32::try_from(state.strings.len()).unwrap_or(u32::MAX);
        state.strings.push(leaked);
        state.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up a string without interning it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.0.read().map.get(text).copied().map(Name::from_raw)
    }

    /// Resolve a name back to its string.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn resolve(&self, name: Name) -> &'static str {
        self.0
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.0.read().strings.len()
    }

    /// Check whether the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.0.read().strings.is_empty()
    }
}

impl std::fmt::Debug for SharedInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let interner = SharedInterner::new();
        let a = interner.intern("code");
        let b = interner.intern("code");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_distinct_names() {
        let interner = SharedInterner::new();
        let a = interner.intern("code");
        let b = interner.intern("tag");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "code");
        assert_eq!(interner.resolve(b), "tag");
    }

    #[test]
    fn test_get_without_interning() {
        let interner = SharedInterner::new();
        assert_eq!(interner.get("missing"), None);
        let name = interner.intern("present");
        assert_eq!(interner.get("present"), Some(name));
    }

    #[test]
    fn test_clones_share_storage() {
        let interner = SharedInterner::new();
        let clone = interner.clone();
        let a = interner.intern("shared");
        assert_eq!(clone.resolve(a), "shared");
        assert_eq!(clone.intern("shared"), a);
    }
}
