//! Delimited field rendering.

use dynrow_ir::{RowConfig, Value};

/// Renders header and value rows under one configuration.
///
/// String fields are always wrapped in the quote character, with embedded
/// quotes replaced by the escape substitution. Everything else renders in
/// its bare text form; null fields render as the configured null text. No
/// line terminator is appended.
pub struct RowWriter {
    cfg: RowConfig,
}

impl RowWriter {
    /// Create a writer over one configuration.
    pub fn new(cfg: RowConfig) -> Self {
        RowWriter { cfg }
    }

    /// The configuration this writer renders under.
    pub fn config(&self) -> &RowConfig {
        &self.cfg
    }

    /// Join field names in order.
    ///
    /// A name is quoted only when it contains the separator or the quote
    /// character.
    pub fn write_header<'a>(&self, names: impl Iterator<Item = &'a str>) -> String {
        let mut out = String::with_capacity(64);
        for (i, name) in names.enumerate() {
            if i > 0 {
                out.push(self.cfg.separator);
            }
            if name.contains(self.cfg.separator) || name.contains(self.cfg.quote) {
                self.push_quoted(&mut out, name);
            } else {
                out.push_str(name);
            }
        }
        out
    }

    /// Join resolved values in order.
    pub fn write_row<'a>(&self, values: impl Iterator<Item = &'a Value>) -> String {
        let mut out = String::with_capacity(64);
        for (i, value) in values.enumerate() {
            if i > 0 {
                out.push(self.cfg.separator);
            }
            self.push_field(&mut out, value);
        }
        out
    }

    fn push_field(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str(&self.cfg.null_text),
            Value::Str(s) => self.push_quoted(out, s),
            Value::Deferred(r) => {
                let concrete = r.reify();
                self.push_field(out, &concrete);
            }
            other => out.push_str(&other.plain()),
        }
    }

    fn push_quoted(&self, out: &mut String, text: &str) {
        out.push(self.cfg.quote);
        out.push_str(&text.replace(self.cfg.quote, &self.cfg.escape));
        out.push(self.cfg.quote);
    }
}
