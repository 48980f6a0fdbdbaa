//! Property scope and declared type tags.

use std::fmt;

/// Whether a property is a process-wide singleton or per-class/instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One shared value, owned by the declaring class and visible identically
    /// through every subclass and instance.
    Global,
    /// Overridable per class (as the fallback default) and per instance.
    Local,
}

impl Scope {
    /// Returns `true` if this is `Global`.
    #[inline]
    pub fn is_global(self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Local => write!(f, "local"),
        }
    }
}

/// Declared payload type of a property.
///
/// Recorded on every definition for consumers to inspect; the engine never
/// enforces it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeTag {
    #[default]
    Any,
    Bool,
    Int,
    Float,
    Str,
    DateTime,
}
