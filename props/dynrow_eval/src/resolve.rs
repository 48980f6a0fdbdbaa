//! Value resolution: the shared invocation pipeline and frozen snapshots.
//!
//! Every read funnels through [`invoke`]: constants pass through,
//! computations run, and reifiable payloads either reify (reified mode) or
//! survive as [`Value::Deferred`] (raw mode).

use dynrow_ir::{errors, Name, PropResult, SharedInterner, Value};

use crate::{Instance, PropValue};

/// Reserved trailing marker of the raw-access name form.
///
/// Reads use the explicit `get_raw` accessor instead of the marked form;
/// the marker is recognized only to reject writes through it.
pub const RAW_MARKER: char = '_';

/// Whether the final reification step runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Full resolution: reifiable payloads produce their concrete value.
    Reified,
    /// Skip reification and hand back the intermediate value.
    Raw,
}

/// Run the invocation pipeline on a raw stored value.
///
/// `instance` is the resolving instance when the read originated at
/// instance level; a `Bound` computation resolved without one fails with
/// `InstanceRequired`.
pub(crate) fn invoke(
    raw: PropValue,
    name: Name,
    instance: Option<&Instance>,
    mode: Mode,
    interner: &SharedInterner,
) -> PropResult<Value> {
    match raw {
        PropValue::Absent => Ok(Value::Null),
        PropValue::Const(v) => Ok(finish(v, mode)),
        PropValue::Thunk(f) => Ok(f()),
        PropValue::Bound(f) => match instance {
            Some(inst) => Ok(f(inst)),
            None => Err(errors::instance_required(interner.resolve(name))),
        },
        PropValue::Reifiable(r) => Ok(match mode {
            Mode::Reified => r.reify(),
            Mode::Raw => Value::Deferred(r),
        }),
    }
}

fn finish(value: Value, mode: Mode) -> Value {
    match mode {
        Mode::Reified => value.reified(),
        Mode::Raw => value,
    }
}

/// Ordered name→value snapshot of a fully resolved instance.
///
/// Keys iterate in the owning class's serialization order, so a `Frozen`
/// always agrees with the header field for field.
#[derive(Clone, Debug, PartialEq)]
pub struct Frozen {
    entries: Vec<(&'static str, Value)>,
}

impl Frozen {
    pub(crate) fn new(entries: Vec<(&'static str, Value)>) -> Self {
        Frozen { entries }
    }

    /// Property names, in serialization order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Resolved values, in serialization order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Look up one resolved value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (*k == name).then_some(v))
    }

    /// Iterate `(name, value)` pairs in serialization order.
    pub fn iter(&self) -> std::slice::Iter<'_, (&'static str, Value)> {
        self.entries.iter()
    }

    /// Number of properties in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Frozen {
    type Item = &'a (&'static str, Value);
    type IntoIter = std::slice::Iter<'a, (&'static str, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
