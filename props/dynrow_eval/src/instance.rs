//! Instances: per-object override slots over a class's property chain.
//!
//! An instance is deliberately single-threaded (`RefCell` slots): the model
//! assumes one logical caller per instance, while the class objects it
//! hangs off are freely shareable.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;

use dynrow_ir::{errors, Name, PropResult, Value};

use crate::resolve::{invoke, Frozen, Mode};
use crate::{PropClass, PropValue, RAW_MARKER};

/// One instance of a declared class.
///
/// Local properties may be overridden per instance; the override slot is
/// created on first write. Global properties are never stored here - their
/// value lives solely on the declaring class.
pub struct Instance {
    class: PropClass,
    /// Per-instance overrides for local properties.
    slots: RefCell<FxHashMap<Name, PropValue>>,
    /// Ad-hoc attributes outside the property system.
    attrs: RefCell<FxHashMap<Name, PropValue>>,
}

impl Instance {
    pub(crate) fn new(class: PropClass) -> Self {
        Instance {
            class,
            slots: RefCell::new(FxHashMap::default()),
            attrs: RefCell::new(FxHashMap::default()),
        }
    }

    /// The class this instance belongs to.
    pub fn class(&self) -> &PropClass {
        &self.class
    }

    /// Read a property (or ad-hoc attribute), reified.
    pub fn get(&self, name: &str) -> PropResult<Value> {
        self.get_mode(name, Mode::Reified)
    }

    /// Read without the final reification step.
    pub fn get_raw(&self, name: &str) -> PropResult<Value> {
        self.get_mode(name, Mode::Raw)
    }

    fn get_mode(&self, name: &str, mode: Mode) -> PropResult<Value> {
        let interner = self.class.interner();
        if let Some(n) = interner.get(name) {
            if let Some(def) = self.class.lookup_name(n) {
                if !def.scope().is_global() {
                    if let Some(raw) = self.slots.borrow().get(&n).cloned() {
                        return invoke(raw, n, Some(self), mode, interner);
                    }
                }
                return self.class.resolve_declared(&def, n, mode, Some(self));
            }
            if let Some(raw) = self.attrs.borrow().get(&n).cloned() {
                return invoke(raw, n, Some(self), mode, interner);
            }
            if let Some(raw) = self.class.attr_cell(n) {
                return invoke(raw, n, Some(self), mode, interner);
            }
        }
        Err(errors::attribute_not_found(name, self.class.name()))
    }

    /// Write a property (or ad-hoc attribute) on this instance.
    ///
    /// Local properties get an override slot; globals are rejected, they
    /// are class-only state.
    pub fn set(&self, name: &str, value: impl Into<PropValue>) -> PropResult<()> {
        self.set_value(name, value.into())
    }

    fn set_value(&self, name: &str, value: PropValue) -> PropResult<()> {
        if let Some(unmarked) = name.strip_suffix(RAW_MARKER) {
            if self.class.lookup(unmarked).is_some() {
                return Err(errors::alias_write(name, unmarked));
            }
        }
        let n = self.class.interner().intern(name);
        match self.class.lookup_name(n) {
            Some(def) if def.scope().is_global() => {
                Err(errors::global_write_on_instance(name))
            }
            Some(_) => {
                self.slots.borrow_mut().insert(n, value);
                Ok(())
            }
            None => {
                self.attrs.borrow_mut().insert(n, value);
                Ok(())
            }
        }
    }

    /// Resolve every property in serialization order into an ordered
    /// snapshot.
    ///
    /// Resolution runs reified; a computation that itself returned a
    /// deferred value is reified once more, so the snapshot holds concrete
    /// values only.
    pub fn freeze(&self) -> PropResult<Frozen> {
        let interner = self.class.interner().clone();
        let key_names: Vec<Name> = self.class.key_names().to_vec();
        let mut entries = Vec::with_capacity(key_names.len());
        for n in key_names {
            let key = interner.resolve(n);
            let value = self.get(key)?.reified();
            entries.push((key, value));
        }
        Ok(Frozen::new(entries))
    }

    /// Human-readable `ClassName(key:'value', ...)` rendering of the
    /// frozen snapshot.
    pub fn describe(&self) -> PropResult<String> {
        let frozen = self.freeze()?;
        let body = frozen
            .iter()
            .map(|(k, v)| format!("{k}:'{}'", v.plain()))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{}({body})", self.class.name()))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("overrides", &self.slots.borrow().len())
            .finish()
    }
}
