//! Row/header writer configuration.

/// Configuration for the delimited writer.
///
/// A class hierarchy resolves its effective configuration to the nearest
/// ancestor that pinned one, falling back to `RowConfig::default()` at the
/// root: tab-separated, double-quoted strings, backslash escape, empty
/// null text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowConfig {
    /// Single-character field separator.
    pub separator: char,
    /// Quote wrapped around string-typed fields.
    pub quote: char,
    /// Substitution for embedded quotes inside string fields.
    pub escape: String,
    /// Rendered form of a null field.
    pub null_text: String,
}

impl RowConfig {
    /// Default configuration with a different separator.
    pub fn with_separator(separator: char) -> Self {
        RowConfig {
            separator,
            ..RowConfig::default()
        }
    }
}

impl Default for RowConfig {
    fn default() -> Self {
        RowConfig {
            separator: '\t',
            quote: '"',
            escape: "\\\"".to_string(),
            null_text: String::new(),
        }
    }
}
