//! dynrow eval - registry construction and the property resolution engine.
//!
//! A class is declared exactly once through [`ClassBuilder`], which merges
//! the class's own property declarations with its parent's into an
//! immutable, order-stable registry. [`PropClass`] and [`Instance`] expose
//! the guarded read/write surface: explicit `get` / `get_raw` / `set`
//! accessors dispatching on the registry, instead of intercepted attribute
//! access.
//!
//! # Scoping
//!
//! - **Global** properties own one storage cell on their declaring class;
//!   every subclass and instance sees the same value, and only the
//!   declaring class may write it.
//! - **Local** properties resolve instance override → nearest class-level
//!   value in the chain → declared default, and may be written at any
//!   class in the chain or on any instance.

mod class;
mod instance;
mod prop_value;
mod resolve;

pub use class::{ClassBuilder, PropClass, PropDef};
pub use instance::Instance;
pub use prop_value::{BoundFn, PropValue, ThunkFn};
pub use resolve::{Frozen, RAW_MARKER};

// Re-export the shared foundations so consumers need one import.
pub use dynrow_ir::{
    errors, Name, PropError, PropResult, Reify, RowConfig, Scope, SharedInterner, TypeTag, Value,
};
