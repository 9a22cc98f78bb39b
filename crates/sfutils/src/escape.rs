//! Value escaping for literal embedding in query strings.
//!
//! Every [`Value`] variant has a defined rendering, so escaping never fails:
//!
//! | value          | output                                           |
//! |----------------|--------------------------------------------------|
//! | `Null`         | `null`                                           |
//! | `Bool`         | `TRUE` / `FALSE`                                 |
//! | `Int`/`Float`  | decimal representation, never quoted             |
//! | non-finite     | `null`                                           |
//! | `DateTime`     | `2000-01-01T12:00:00+00:00`                      |
//! | `Date`         | `2000-01-01`                                     |
//! | `Safe`         | verbatim                                         |
//! | `Text`         | escaped, optionally quoted                       |
//! | `List`         | `escape_list` of the items                       |

use crate::value::{SafeString, Value, format_date, format_datetime};

pub const QUOTE_OPEN: char = '\'';
pub const QUOTE_CLOSE: char = '\'';
pub const VALUE_NULL: &str = "null";
pub const VALUE_TRUE: &str = "TRUE";
pub const VALUE_FALSE: &str = "FALSE";

/// How an escaped value is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EscapeContext {
    /// The value sits inside a `LIKE` pattern; `_` and `%` are escaped.
    pub pattern_match: bool,
    /// Wrap free text in string-literal delimiters.
    pub quote: bool,
}

impl EscapeContext {
    /// Unquoted, not a pattern.
    pub const RAW: Self = Self {
        pattern_match: false,
        quote: false,
    };

    /// Quoted, not a pattern.
    pub const QUOTED: Self = Self {
        pattern_match: false,
        quote: true,
    };

    pub fn new(pattern_match: bool, quote: bool) -> Self {
        Self {
            pattern_match,
            quote,
        }
    }

    pub fn pattern_match(mut self, on: bool) -> Self {
        self.pattern_match = on;
        self
    }

    pub fn quote(mut self, on: bool) -> Self {
        self.quote = on;
        self
    }
}

/// Escape `value` for literal embedding.
pub fn escape(value: &Value, ctx: EscapeContext) -> String {
    let mut out = String::new();
    write_escaped(&mut out, value, ctx);
    out
}

/// Escape each value as a quoted literal and join with `, `.
///
/// An empty slice yields an empty string.
pub fn escape_list(values: &[Value]) -> String {
    let mut out = String::new();
    write_escaped_list(&mut out, values);
    out
}

pub(crate) fn write_escaped_list(out: &mut String, values: &[Value]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_escaped(out, value, EscapeContext::QUOTED);
    }
}

pub(crate) fn write_escaped(out: &mut String, value: &Value, ctx: EscapeContext) {
    use std::fmt::Write;

    match value {
        Value::Null => out.push_str(VALUE_NULL),
        Value::Bool(true) => out.push_str(VALUE_TRUE),
        Value::Bool(false) => out.push_str(VALUE_FALSE),
        // Writing into a String cannot fail.
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(n) if n.is_finite() => {
            let _ = write!(out, "{n}");
        }
        // NaN and infinities have no literal form.
        Value::Float(_) => out.push_str(VALUE_NULL),
        Value::DateTime(dt) => out.push_str(&format_datetime(dt)),
        Value::Date(d) => out.push_str(&format_date(d)),
        Value::Safe(s) => out.push_str(s.as_str()),
        Value::Text(s) => {
            if ctx.quote {
                out.push(QUOTE_OPEN);
            }
            push_escaped_text(out, s, ctx.pattern_match);
            if ctx.quote {
                out.push(QUOTE_CLOSE);
            }
        }
        Value::List(items) => write_escaped_list(out, items),
    }
}

/// Single pass: output characters are never re-examined, so a backslash
/// introduced by one replacement is not escaped again.
fn push_escaped_text(out: &mut String, text: &str, pattern_match: bool) {
    out.reserve(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '_' if pattern_match => out.push_str("\\_"),
            '%' if pattern_match => out.push_str("\\%"),
            _ => out.push(ch),
        }
    }
}

impl SafeString {
    /// Escape `value` and mark the result as safe.
    pub fn escape(value: &Value, pattern_match: bool, quote: bool) -> Self {
        SafeString::new(escape(value, EscapeContext::new(pattern_match, quote)))
    }

    /// Escape each value as a quoted literal and join into an `IN`-compatible list.
    pub fn escape_list(values: &[Value]) -> Self {
        SafeString::new(escape_list(values))
    }
}
