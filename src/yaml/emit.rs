//! Scalar emission under the YAML 1.2 core schema.
//!
//! Strings are written bare wherever a plain scalar reads back as the same
//! string, single-quoted when it would not, and double-quoted only when an
//! escape sequence is required. `on`, `off`, `yes` and `no` are plain strings
//! under the core schema and stay bare.

use crate::yaml::tree::Scalar;
use once_cell::sync::Lazy;
use regex::Regex;

/// Where a scalar is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Mapping values, keys and `- item` lines
    Block,
    /// Inside `[...]` or `{...}`
    Flow,
}

static CORE_NULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:~|null|Null|NULL)$").expect("valid regex"));
static CORE_BOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:true|True|TRUE|false|False|FALSE)$").expect("valid regex"));
static CORE_INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+)$").expect("valid regex")
});
static CORE_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .expect("valid regex")
});

pub fn scalar(value: &Scalar, context: Context) -> String {
    match value {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(value) => value.to_string(),
        Scalar::Integer(value) => value.to_string(),
        Scalar::Float(value) => float(*value),
        Scalar::String(value) => string(value, context),
    }
}

/// Mapping keys follow the block policy.
pub fn key(value: &str) -> String {
    string(value, Context::Block)
}

pub fn string(value: &str, context: Context) -> String {
    if needs_escapes(value) {
        return double_quoted(value);
    }
    if needs_quotes(value, context) {
        return format!("'{}'", value.replace('\'', "''"));
    }
    value.to_string()
}

/// Re-quote `value` in the style of the token it replaces, when that token
/// was quoted and the style can carry the value.
pub fn quoted_like(value: &str, token: &str) -> Option<String> {
    match token.as_bytes().first() {
        Some(b'"') => Some(double_quoted(value)),
        Some(b'\'') if !needs_escapes(value) => Some(format!("'{}'", value.replace('\'', "''"))),
        _ => None,
    }
}

/// Whether `value` written bare would resolve to something other than the string.
pub fn resolves_to_non_string(value: &str) -> bool {
    CORE_NULL.is_match(value)
        || CORE_BOOL.is_match(value)
        || CORE_INT.is_match(value)
        || CORE_FLOAT.is_match(value)
}

fn needs_escapes(value: &str) -> bool {
    value.chars().any(|ch| ch.is_control() && ch != '\t')
}

fn needs_quotes(value: &str, context: Context) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };

    if value.trim() != value || resolves_to_non_string(value) {
        return true;
    }
    if value.contains(" #") || value.contains("\t#") {
        return true;
    }
    let colon = match context {
        Context::Block => value.ends_with(':') || value.contains(": ") || value.contains(":\t"),
        Context::Flow => value.contains(':'),
    };
    if colon {
        return true;
    }
    if matches!(
        first,
        '[' | ']' | '{' | '}' | ',' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    ) {
        return true;
    }
    if matches!(first, '-' | '?') {
        let second = value[1..].chars().next();
        if second.is_none() || second == Some(' ') {
            return true;
        }
    }
    context == Context::Flow && value.contains([',', '[', ']', '{', '}'])
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            ch if ch.is_control() => out.push_str(&format!("\\u{:04X}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn float(value: f64) -> String {
    if value.is_nan() {
        ".nan".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { ".inf" } else { "-.inf" };
        text.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
