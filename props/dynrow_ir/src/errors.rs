//! Typed errors for declaration and property access.
//!
//! Every failure is synchronous and non-retryable: it surfaces at the call
//! site that attempted the illegal operation and leaves the class and
//! instance graph unmodified. Factory functions are the preferred
//! construction surface; they keep call sites terse and the cold path out
//! of line.

use crate::Scope;
use thiserror::Error;

/// Result of a declaration or property access.
pub type PropResult<T> = Result<T, PropError>;

/// Error raised by the property model.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PropError {
    /// One class declared the same name twice with conflicting scopes.
    #[error("`{name}` is declared twice with conflicting scopes")]
    DuplicateDeclaration { name: String },

    /// A subclass re-declared an inherited name with a different scope.
    #[error("`{name}` is {original} in an ancestor class and cannot change scope")]
    ScopeConflict { name: String, original: Scope },

    /// A subclass declared a default for an ancestor's global property.
    #[error("`{name}` must be given its default by the class that declares it")]
    InheritedGlobalDefault { name: String },

    /// A parent marker was declared on a class with no parent.
    #[error("`{class}` declares a parent marker but has no parent class")]
    MarkerWithoutParent { class: String },

    /// A global property was written outside its declaring class.
    #[error("`{name}` can only be set on `{declarer}`, its declaring class")]
    GlobalWriteOutsideDeclarer { name: String, declarer: String },

    /// A global property was written through an instance.
    #[error("`{name}` is a class-only property and cannot be set on an instance")]
    GlobalWriteOnInstance { name: String },

    /// A write used the raw-marked name form.
    #[error("`{name}` is not settable - use `{unmarked}` instead")]
    AliasWrite { name: String, unmarked: String },

    /// Neither the property system nor the ad-hoc attributes know the name.
    #[error("`{class}` has no property or attribute named `{name}`")]
    AttributeNotFound { name: String, class: String },

    /// An instance-bound computation was resolved without an instance.
    #[error("`{name}` is bound to an instance and cannot be resolved at class level")]
    InstanceRequired { name: String },
}

/// Duplicate declaration within a single class.
#[cold]
pub fn duplicate_declaration(name: &str) -> PropError {
    PropError::DuplicateDeclaration {
        name: name.to_string(),
    }
}

/// Re-declaration changing an inherited scope.
#[cold]
pub fn scope_conflict(name: &str, original: Scope) -> PropError {
    PropError::ScopeConflict {
        name: name.to_string(),
        original,
    }
}

/// Default declared for an ancestor's global property.
#[cold]
pub fn inherited_global_default(name: &str) -> PropError {
    PropError::InheritedGlobalDefault {
        name: name.to_string(),
    }
}

/// Parent marker on a root class.
#[cold]
pub fn marker_without_parent(class: &str) -> PropError {
    PropError::MarkerWithoutParent {
        class: class.to_string(),
    }
}

/// Global write attempted away from the declaring class.
#[cold]
pub fn global_write_outside_declarer(name: &str, declarer: &str) -> PropError {
    PropError::GlobalWriteOutsideDeclarer {
        name: name.to_string(),
        declarer: declarer.to_string(),
    }
}

/// Global write attempted through an instance.
#[cold]
pub fn global_write_on_instance(name: &str) -> PropError {
    PropError::GlobalWriteOnInstance {
        name: name.to_string(),
    }
}

/// Write through the raw-marked name form.
#[cold]
pub fn alias_write(name: &str, unmarked: &str) -> PropError {
    PropError::AliasWrite {
        name: name.to_string(),
        unmarked: unmarked.to_string(),
    }
}

/// Name unknown to both the property system and the ad-hoc attributes.
#[cold]
pub fn attribute_not_found(name: &str, class: &str) -> PropError {
    PropError::AttributeNotFound {
        name: name.to_string(),
        class: class.to_string(),
    }
}

/// Instance-bound computation resolved at class level.
#[cold]
pub fn instance_required(name: &str) -> PropError {
    PropError::InstanceRequired {
        name: name.to_string(),
    }
}
