//! Runtime values produced by property resolution.

use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;

/// A value that renders itself concrete on demand.
///
/// Deferred values pass through resolution untouched in raw mode; the
/// reified read path calls [`Reify::reify`] exactly once. Implementations
/// must terminate in a concrete [`Value`].
pub trait Reify: Send + Sync {
    /// Produce the concrete value.
    fn reify(&self) -> Value;
}

/// Concrete runtime value.
///
/// `Null` is the resolved form of an absent property. `Deferred` holds an
/// un-reified value and only escapes the engine in raw mode, or when a
/// computation itself returns one.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    DateTime(NaiveDateTime),
    Deferred(Arc<dyn Reify>),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Arc::from(s.into()))
    }

    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a date-time value.
    #[inline]
    pub fn datetime(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }

    /// Create a deferred value from a reifiable payload.
    #[inline]
    pub fn deferred(payload: impl Reify + 'static) -> Self {
        Value::Deferred(Arc::new(payload))
    }

    /// Returns `true` for `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reify one level of deferral, passing every other value through.
    pub fn reified(self) -> Value {
        match self {
            Value::Deferred(r) => r.reify(),
            other => other,
        }
    }

    /// Bare text form, used by the delimited writer and by descriptions.
    ///
    /// No quoting is applied and `Null` renders empty; deferred values are
    /// reified first.
    pub fn plain(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Str(s) => s.as_ref().to_owned(),
            Value::DateTime(dt) => dt.to_string(),
            Value::Deferred(r) => r.reify().plain(),
        }
    }
}

impl PartialEq for Value {
    #[expect(clippy::float_cmp, reason = "value identity, not arithmetic comparison")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            // Deferred payloads compare by identity.
            (Value::Deferred(a), Value::Deferred(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{}\"", s.as_ref()),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Deferred(_) => write!(f, "<deferred>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}
