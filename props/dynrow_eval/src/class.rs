//! Runtime class objects and registry construction.
//!
//! A [`PropClass`] is declared exactly once through [`ClassBuilder`], which
//! validates the class's own declarations against the ancestor chain and
//! flattens the serialization order. The registry (definitions + key order)
//! is immutable after `build`; only the current-value cells, the ad-hoc
//! attributes and the writer-configuration slot mutate afterwards.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use dynrow_ir::{errors, Name, PropResult, RowConfig, Scope, SharedInterner, TypeTag, Value};

use crate::resolve::{invoke, Mode};
use crate::{Instance, PropValue, RAW_MARKER};

/// One property definition, as declared by a single class.
#[derive(Clone, Debug)]
pub struct PropDef {
    name: Name,
    scope: Scope,
    tag: TypeTag,
    default: PropValue,
    /// True when an ancestor already declared this name.
    shadow: bool,
}

impl PropDef {
    /// Interned property name.
    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Declared scope.
    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Declared type tag (recorded, never enforced).
    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Compile-time default value.
    #[inline]
    pub fn default(&self) -> &PropValue {
        &self.default
    }

    /// True when this definition re-declares an ancestor's name.
    #[inline]
    pub fn is_shadow(&self) -> bool {
        self.shadow
    }

    /// Whether this definition owns a current-value cell on its class.
    ///
    /// Every original declaration does. A shadowing re-declaration only does
    /// when it carries its own local default; otherwise reads fall through
    /// to the ancestor's current value.
    pub(crate) fn seeds_cell(&self) -> bool {
        !self.shadow || (!self.scope.is_global() && !self.default.is_absent())
    }
}

/// Flattened, order-stable registry for one class.
#[derive(Debug)]
struct Registry {
    /// This class's own definitions, shadowing re-declarations included.
    defs: FxHashMap<Name, PropDef>,
    /// Full serialization order across the whole chain.
    keys: SmallVec<[Name; 8]>,
}

struct ClassData {
    name: String,
    parent: Option<PropClass>,
    interner: SharedInterner,
    registry: Registry,
    /// Current class-level values, seeded from defaults at build time.
    values: RwLock<FxHashMap<Name, PropValue>>,
    /// Ad-hoc attributes outside the property system.
    attrs: RwLock<FxHashMap<Name, PropValue>>,
    /// Writer configuration slot; `None` inherits through the parent chain.
    row_cfg: RwLock<Option<RowConfig>>,
}

/// Handle to a declared class.
///
/// Cheap to clone; all clones address the same class object. The handle is
/// thread-shareable, but the model assumes one logical writer at a time and
/// provides no atomicity across multiple operations.
#[derive(Clone)]
pub struct PropClass(Arc<ClassData>);

impl PropClass {
    /// Class name, as given to the builder.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Parent class, if any.
    pub fn parent(&self) -> Option<&PropClass> {
        self.0.parent.as_ref()
    }

    /// The interner shared along this hierarchy.
    pub fn interner(&self) -> &SharedInterner {
        &self.0.interner
    }

    /// Serialization order of every property in the chain.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0
            .registry
            .keys
            .iter()
            .map(|&n| self.0.interner.resolve(n))
    }

    pub(crate) fn key_names(&self) -> &[Name] {
        &self.0.registry.keys
    }

    /// Whether two handles address the same class object.
    pub fn same_class(&self, other: &PropClass) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Create a fresh instance of this class.
    pub fn instance(&self) -> Instance {
        Instance::new(self.clone())
    }

    /// Nearest definition of `name`, searching this class then the chain.
    pub fn lookup(&self, name: &str) -> Option<PropDef> {
        let n = self.0.interner.get(name)?;
        self.lookup_name(n)
    }

    pub(crate) fn lookup_name(&self, name: Name) -> Option<PropDef> {
        if let Some(def) = self.0.registry.defs.get(&name) {
            return Some(def.clone());
        }
        self.0.parent.as_ref().and_then(|p| p.lookup_name(name))
    }

    /// The class that originally declared `name` (the topmost declarer).
    pub fn declaring_class(&self, name: &str) -> Option<PropClass> {
        let n = self.0.interner.get(name)?;
        self.declaring_class_by_name(n)
    }

    pub(crate) fn declaring_class_by_name(&self, name: Name) -> Option<PropClass> {
        let mut found = None;
        let mut current = Some(self.clone());
        while let Some(class) = current {
            if class.0.registry.defs.contains_key(&name) {
                found = Some(class.clone());
            }
            current = class.0.parent.clone();
        }
        found
    }

    /// This class's own current-value cell for `name`, if one exists.
    pub(crate) fn cell(&self, name: Name) -> Option<PropValue> {
        self.0.values.read().get(&name).cloned()
    }

    /// Nearest current-value cell for `name`, walking the chain upward.
    pub(crate) fn nearest_cell(&self, name: Name) -> Option<PropValue> {
        if let Some(v) = self.cell(name) {
            return Some(v);
        }
        self.0.parent.as_ref().and_then(|p| p.nearest_cell(name))
    }

    fn own_default(&self, name: Name) -> PropValue {
        self.0
            .registry
            .defs
            .get(&name)
            .map_or(PropValue::Absent, |def| def.default.clone())
    }

    /// Nearest ad-hoc attribute for `name`, walking the chain upward.
    pub(crate) fn attr_cell(&self, name: Name) -> Option<PropValue> {
        if let Some(v) = self.0.attrs.read().get(&name).cloned() {
            return Some(v);
        }
        self.0.parent.as_ref().and_then(|p| p.attr_cell(name))
    }

    /// Read a property (or ad-hoc attribute) at class level, reified.
    pub fn get(&self, name: &str) -> PropResult<Value> {
        self.get_mode(name, Mode::Reified)
    }

    /// Read at class level without the final reification step.
    pub fn get_raw(&self, name: &str) -> PropResult<Value> {
        self.get_mode(name, Mode::Raw)
    }

    fn get_mode(&self, name: &str, mode: Mode) -> PropResult<Value> {
        if let Some(n) = self.0.interner.get(name) {
            if let Some(def) = self.lookup_name(n) {
                return self.resolve_declared(&def, n, mode, None);
            }
            if let Some(raw) = self.attr_cell(n) {
                return invoke(raw, n, None, mode, &self.0.interner);
            }
        }
        Err(errors::attribute_not_found(name, self.name()))
    }

    /// Resolve a declared property from its storage cell.
    ///
    /// Globals read the single cell owned by the declaring class; locals
    /// read the nearest cell in the chain, falling back to the nearest
    /// definition's compile-time default.
    pub(crate) fn resolve_declared(
        &self,
        def: &PropDef,
        name: Name,
        mode: Mode,
        instance: Option<&Instance>,
    ) -> PropResult<Value> {
        let raw = if def.scope().is_global() {
            match self.declaring_class_by_name(name) {
                Some(declarer) => declarer
                    .cell(name)
                    .unwrap_or_else(|| declarer.own_default(name)),
                None => PropValue::Absent,
            }
        } else {
            self.nearest_cell(name)
                .unwrap_or_else(|| def.default().clone())
        };
        invoke(raw, name, instance, mode, &self.0.interner)
    }

    /// Write a property (or ad-hoc attribute) at class level.
    ///
    /// Globals may only be written on their declaring class; locals set this
    /// class's current value, shadowing the chain for this class and its
    /// descendants.
    pub fn set(&self, name: &str, value: impl Into<PropValue>) -> PropResult<()> {
        self.set_value(name, value.into())
    }

    fn set_value(&self, name: &str, value: PropValue) -> PropResult<()> {
        if let Some(unmarked) = name.strip_suffix(RAW_MARKER) {
            if self.lookup(unmarked).is_some() {
                return Err(errors::alias_write(name, unmarked));
            }
        }
        let n = self.0.interner.intern(name);
        match self.lookup_name(n) {
            Some(def) if def.scope().is_global() => {
                let declarer = self
                    .declaring_class_by_name(n)
                    .unwrap_or_else(|| self.clone());
                if !self.same_class(&declarer) {
                    return Err(errors::global_write_outside_declarer(
                        name,
                        declarer.name(),
                    ));
                }
                tracing::trace!(class = self.name(), prop = name, "set global");
                self.0.values.write().insert(n, value);
                Ok(())
            }
            Some(_) => {
                tracing::trace!(class = self.name(), prop = name, "set local");
                self.0.values.write().insert(n, value);
                Ok(())
            }
            None => {
                self.0.attrs.write().insert(n, value);
                Ok(())
            }
        }
    }

    /// Reset every property this class itself declared to its declared
    /// default.
    ///
    /// Ancestor-owned cells, descendant cells and instance overrides are
    /// untouched; shadowing re-declarations without their own default keep
    /// falling through to the ancestor's current value.
    pub fn clear(&self) {
        let mut values = self.0.values.write();
        for def in self.0.registry.defs.values() {
            if def.seeds_cell() {
                values.insert(def.name(), def.default().clone());
            }
        }
        drop(values);
        tracing::debug!(class = self.name(), "reset to declared defaults");
    }

    /// Effective writer configuration: the nearest pinned slot in the
    /// chain, or the default configuration at the root.
    pub fn row_config(&self) -> RowConfig {
        if let Some(cfg) = self.0.row_cfg.read().clone() {
            return cfg;
        }
        self.0
            .parent
            .as_ref()
            .map_or_else(RowConfig::default, PropClass::row_config)
    }

    /// Pin this class's field separator.
    ///
    /// Takes effect for every subsequent row/header call on this class and
    /// on descendants that have not pinned their own slot.
    pub fn set_separator(&self, separator: char) {
        let mut cfg = self.row_config();
        cfg.separator = separator;
        *self.0.row_cfg.write() = Some(cfg);
    }

    /// Current quote-escape substitution.
    pub fn escape(&self) -> String {
        self.row_config().escape
    }

    /// Replace the quote-escape substitution, returning the previous one.
    pub fn set_escape(&self, escape: &str) -> String {
        let mut cfg = self.row_config();
        let previous = std::mem::replace(&mut cfg.escape, escape.to_string());
        *self.0.row_cfg.write() = Some(cfg);
        previous
    }
}

impl fmt::Debug for PropClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropClass")
            .field("name", &self.0.name)
            .field("keys", &self.0.registry.keys.len())
            .field(
                "parent",
                &self.0.parent.as_ref().map(|p| p.name().to_owned()),
            )
            .finish()
    }
}

/// One pending declaration inside the builder.
struct Decl {
    name: String,
    scope: Scope,
    tag: TypeTag,
    default: PropValue,
}

/// Declares a class and builds its registry.
///
/// Declarations are kept in source order; the optional parent marker pins
/// where the ancestor's property block lands in the flattened key order
/// (ancestor block first when no marker is declared).
pub struct ClassBuilder {
    name: String,
    parent: Option<PropClass>,
    decls: Vec<Decl>,
    marker: Option<usize>,
}

impl ClassBuilder {
    /// Start a root class with no parent.
    pub fn root(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            parent: None,
            decls: Vec::new(),
            marker: None,
        }
    }

    /// Start a subclass of `parent`.
    pub fn extend(parent: &PropClass, name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            parent: Some(parent.clone()),
            decls: Vec::new(),
            marker: None,
        }
    }

    /// Declare a global (singleton) property with no default.
    pub fn global(self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.declare(name, Scope::Global, tag, PropValue::Absent)
    }

    /// Declare a global (singleton) property with a default value.
    pub fn global_with(
        self,
        name: impl Into<String>,
        tag: TypeTag,
        default: impl Into<PropValue>,
    ) -> Self {
        self.declare(name, Scope::Global, tag, default.into())
    }

    /// Declare a local (per-class/instance) property with no default.
    pub fn local(self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.declare(name, Scope::Local, tag, PropValue::Absent)
    }

    /// Declare a local (per-class/instance) property with a default value.
    pub fn local_with(
        self,
        name: impl Into<String>,
        tag: TypeTag,
        default: impl Into<PropValue>,
    ) -> Self {
        self.declare(name, Scope::Local, tag, default.into())
    }

    fn declare(
        mut self,
        name: impl Into<String>,
        scope: Scope,
        tag: TypeTag,
        default: PropValue,
    ) -> Self {
        self.decls.push(Decl {
            name: name.into(),
            scope,
            tag,
            default,
        });
        self
    }

    /// Pin the ancestor's property block at the current position.
    ///
    /// The last call wins, matching re-declaration of the marker.
    pub fn parent_block(mut self) -> Self {
        self.marker = Some(self.decls.len());
        self
    }

    /// Validate the declarations, merge with the parent registry and
    /// publish the class.
    ///
    /// No partial registry is published on failure.
    #[tracing::instrument(level = "debug", skip_all, fields(class = %self.name))]
    pub fn build(self) -> PropResult<PropClass> {
        if self.marker.is_some() && self.parent.is_none() {
            return Err(errors::marker_without_parent(&self.name));
        }
        let interner = self
            .parent
            .as_ref()
            .map_or_else(SharedInterner::new, |p| p.interner().clone());

        // Own definitions: first declaration fixes the position and scope,
        // a repeated same-scope declaration updates default and tag.
        let mut defs: FxHashMap<Name, PropDef> = FxHashMap::default();
        for decl in &self.decls {
            let name = interner.intern(&decl.name);
            if let Some(existing) = defs.get_mut(&name) {
                if existing.scope != decl.scope {
                    return Err(errors::duplicate_declaration(&decl.name));
                }
                if existing.shadow && existing.scope.is_global() && !decl.default.is_absent() {
                    return Err(errors::inherited_global_default(&decl.name));
                }
                existing.tag = decl.tag;
                existing.default = decl.default.clone();
                continue;
            }
            let inherited = self.parent.as_ref().and_then(|p| p.lookup_name(name));
            if let Some(inh) = &inherited {
                if inh.scope() != decl.scope {
                    return Err(errors::scope_conflict(&decl.name, inh.scope()));
                }
                if inh.scope().is_global() && !decl.default.is_absent() {
                    return Err(errors::inherited_global_default(&decl.name));
                }
            }
            defs.insert(
                name,
                PropDef {
                    name,
                    scope: decl.scope,
                    tag: decl.tag,
                    default: decl.default.clone(),
                    shadow: inherited.is_some(),
                },
            );
        }

        // Flattened key order: the ancestor block lands at the marker
        // position (the very start when absent); own new names keep their
        // declared positions; shadowed names keep the ancestor position.
        let marker = self.marker.unwrap_or(0);
        let mut keys: SmallVec<[Name; 8]> = SmallVec::new();
        let mut seen: FxHashSet<Name> = FxHashSet::default();
        let parent_keys: &[Name] = self.parent.as_ref().map_or(&[], |p| p.key_names());
        for (position, decl) in self.decls.iter().enumerate() {
            if position == marker {
                keys.extend_from_slice(parent_keys);
            }
            let name = interner.intern(&decl.name);
            if seen.insert(name) {
                if let Some(def) = defs.get(&name) {
                    if !def.is_shadow() {
                        keys.push(name);
                    }
                }
            }
        }
        if marker >= self.decls.len() {
            keys.extend_from_slice(parent_keys);
        }

        // Propagate defaults into this class's current-value cells.
        let mut values: FxHashMap<Name, PropValue> = FxHashMap::default();
        for def in defs.values() {
            if def.seeds_cell() {
                values.insert(def.name, def.default.clone());
            }
        }

        tracing::debug!(
            props = defs.len(),
            columns = keys.len(),
            "class declared"
        );
        Ok(PropClass(Arc::new(ClassData {
            name: self.name,
            parent: self.parent,
            interner,
            registry: Registry { defs, keys },
            values: RwLock::new(values),
            attrs: RwLock::new(FxHashMap::default()),
            row_cfg: RwLock::new(None),
        })))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event() -> PropClass {
        ClassBuilder::root("Event")
            .global("created_at", TypeTag::DateTime)
            .global_with("source", TypeTag::Str, "Unspecified")
            .local_with("status", TypeTag::Str, "new")
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_keys_follow_declaration_order() {
        let class = event();
        let keys: Vec<_> = class.keys().collect();
        assert_eq!(keys, vec!["created_at", "source", "status"]);
    }

    #[test]
    fn test_parent_block_first_without_marker() {
        let parent = event();
        let child = ClassBuilder::extend(&parent, "TaggedEvent")
            .local_with("tag", TypeTag::Str, "@")
            .build()
            .unwrap();
        let keys: Vec<_> = child.keys().collect();
        assert_eq!(keys, vec!["created_at", "source", "status", "tag"]);
    }

    #[test]
    fn test_marker_pins_parent_block() {
        let parent = event();
        let first = ClassBuilder::extend(&parent, "BatchFirst")
            .global("batch_id", TypeTag::Int)
            .parent_block()
            .build()
            .unwrap();
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["batch_id", "created_at", "source", "status"]
        );

        let middle = ClassBuilder::extend(&parent, "BatchMiddle")
            .global("batch_id", TypeTag::Int)
            .parent_block()
            .local("note", TypeTag::Str)
            .build()
            .unwrap();
        assert_eq!(
            middle.keys().collect::<Vec<_>>(),
            vec!["batch_id", "created_at", "source", "status", "note"]
        );
    }

    #[test]
    fn test_shadow_keeps_ancestor_position() {
        let parent = event();
        let child = ClassBuilder::extend(&parent, "Renumbered")
            .global("batch_id", TypeTag::Int)
            .global("source", TypeTag::Str)
            .parent_block()
            .build()
            .unwrap();
        // `source` stays where the ancestor put it, `batch_id` is new.
        assert_eq!(
            child.keys().collect::<Vec<_>>(),
            vec!["batch_id", "created_at", "source", "status"]
        );
    }

    #[test]
    fn test_duplicate_scope_conflict_in_one_class() {
        let err = ClassBuilder::root("Broken")
            .local("x", TypeTag::Int)
            .global("x", TypeTag::Int)
            .build()
            .unwrap_err();
        assert!(matches!(err, dynrow_ir::PropError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn test_duplicate_same_scope_updates_default() {
        let class = ClassBuilder::root("Twice")
            .local_with("x", TypeTag::Int, 1_i64)
            .local_with("x", TypeTag::Int, 2_i64)
            .build()
            .unwrap();
        assert_eq!(class.keys().count(), 1);
        assert_eq!(class.get("x").unwrap(), Value::int(2));
    }

    #[test]
    fn test_scope_conflict_across_chain() {
        let parent = event();
        let err = ClassBuilder::extend(&parent, "Broken")
            .global("status", TypeTag::Str)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            dynrow_ir::PropError::ScopeConflict {
                original: Scope::Local,
                ..
            }
        ));
    }

    #[test]
    fn test_inherited_global_default_rejected() {
        let parent = event();
        let err = ClassBuilder::extend(&parent, "Broken")
            .global_with("source", TypeTag::Str, "nope")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            dynrow_ir::PropError::InheritedGlobalDefault { .. }
        ));
    }

    #[test]
    fn test_marker_without_parent_rejected() {
        let err = ClassBuilder::root("Orphan")
            .parent_block()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            dynrow_ir::PropError::MarkerWithoutParent { .. }
        ));
    }

    #[test]
    fn test_declaring_class_is_topmost() {
        let parent = event();
        let child = ClassBuilder::extend(&parent, "Child")
            .global("source", TypeTag::Str)
            .build()
            .unwrap();
        let declarer = child.declaring_class("source").unwrap();
        assert!(declarer.same_class(&parent));
    }

    #[test]
    fn test_lookup_walks_chain() {
        let parent = event();
        let child = ClassBuilder::extend(&parent, "Child")
            .local("extra", TypeTag::Any)
            .build()
            .unwrap();
        assert_eq!(child.lookup("status").unwrap().scope(), Scope::Local);
        assert_eq!(child.lookup("extra").unwrap().scope(), Scope::Local);
        assert!(parent.lookup("extra").is_none());
        assert!(child.lookup("missing").is_none());
    }
}
