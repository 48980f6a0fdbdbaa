//! The tagged union of un-resolved property values.
//!
//! The author picks the variant explicitly at declaration or write time;
//! the engine never inspects call signatures to guess what it was given.

use dynrow_ir::{Reify, Value};
use std::fmt;
use std::sync::Arc;

use crate::Instance;

/// Zero-argument computation payload.
pub type ThunkFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Instance-bound computation payload, invoked with the resolving instance.
pub type BoundFn = Arc<dyn Fn(&Instance) -> Value + Send + Sync>;

/// Current or default value of a property, before resolution.
#[derive(Clone)]
pub enum PropValue {
    /// No value; resolves to [`Value::Null`].
    Absent,
    /// A plain constant.
    Const(Value),
    /// Zero-argument computation, invoked on every read.
    Thunk(ThunkFn),
    /// One-argument computation, invoked with the resolving instance.
    Bound(BoundFn),
    /// A value exposing a `reify` step, deferred until read.
    Reifiable(Arc<dyn Reify>),
}

impl PropValue {
    /// Create a zero-argument computation value.
    pub fn thunk(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        PropValue::Thunk(Arc::new(f))
    }

    /// Create an instance-bound computation value.
    pub fn bound(f: impl Fn(&Instance) -> Value + Send + Sync + 'static) -> Self {
        PropValue::Bound(Arc::new(f))
    }

    /// Create a deferred value from a reifiable payload.
    pub fn reifiable(payload: impl Reify + 'static) -> Self {
        PropValue::Reifiable(Arc::new(payload))
    }

    /// Returns `true` for `Absent`.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, PropValue::Absent)
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Absent => write!(f, "Absent"),
            PropValue::Const(v) => f.debug_tuple("Const").field(v).finish(),
            PropValue::Thunk(_) => write!(f, "Thunk(..)"),
            PropValue::Bound(_) => write!(f, "Bound(..)"),
            PropValue::Reifiable(_) => write!(f, "Reifiable(..)"),
        }
    }
}

impl From<Value> for PropValue {
    fn from(v: Value) -> Self {
        PropValue::Const(v)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Const(Value::Bool(b))
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Const(Value::Int(n))
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Const(Value::Float(n))
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Const(Value::string(s))
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Const(Value::string(s))
    }
}
