//! dynrow IR - shared foundations for the dynrow property model.
//!
//! This crate holds the pieces every other dynrow crate agrees on:
//!
//! - [`Name`] and [`SharedInterner`]: interned property/class names
//! - [`Value`] and [`Reify`]: concrete runtime values and deferred payloads
//! - [`Scope`] and [`TypeTag`]: declaration metadata
//! - [`PropError`] / [`PropResult`]: the typed failure surface
//! - [`RowConfig`]: delimited-writer configuration

mod config;
pub mod errors;
mod interner;
mod name;
mod scope;
mod value;

pub use config::RowConfig;
pub use errors::{PropError, PropResult};
pub use interner::SharedInterner;
pub use name::Name;
pub use scope::{Scope, TypeTag};
pub use value::{Reify, Value};
