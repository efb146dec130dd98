//! Value codec: parameters out, replies in.
//!
//! ## Outbound
//!
//! Parameters are serialized *shallowly*: text and numbers pass through, and
//! structured values (arrays, objects, null) are JSON-encoded once. Each token
//! is then percent-encoded with the `encodeURIComponent` unreserved set and the
//! tokens are joined with `/`.
//!
//! ## Inbound
//!
//! The store only holds strings, so a structured value that was sent as JSON
//! comes back as a JSON string. [`decode_value`] therefore attempts to parse
//! every string in a reply. This is a deliberate best-effort heuristic: a
//! string that does not parse is kept verbatim, so nothing is lost, but a
//! numeric-looking string such as `"42"` does come back as the number `42`.
//! [`try_parse`] exposes the per-string step as a tagged [`Decoded`] result for
//! callers that need to know which branch was taken.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::command::{Arg, Command};

/// Characters escaped by `encodeURIComponent`: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Shallow-serializes one parameter to its textual form.
///
/// Structured values are JSON-encoded; everything else passes through in its
/// natural text form. Binary parameters are decoded as UTF-8 with replacement;
/// they normally never reach this point because a trailing payload is sent as
/// the request body instead.
pub fn stringify_arg(arg: &Arg) -> Cow<'_, str> {
    match arg {
        Arg::Text(s) => Cow::Borrowed(s),
        Arg::Int(n) => Cow::Owned(n.to_string()),
        Arg::Float(f) => Cow::Owned(format_float(*f)),
        Arg::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Arg::Json(Value::String(s)) => Cow::Borrowed(s),
        Arg::Json(Value::Bool(b)) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Arg::Json(Value::Number(n)) => Cow::Owned(n.to_string()),
        Arg::Json(v) => Cow::Owned(v.to_string()),
        Arg::Binary(bytes) => String::from_utf8_lossy(bytes),
    }
}

/// Formats a float the way a JavaScript `Number` prints: plain decimals for
/// `1e-6 <= |f| < 1e21`, shortest exponent form (`1e+21`, `1.5e-7`) outside.
fn format_float(f: f64) -> String {
    match f {
        f if f == f64::INFINITY => "Infinity".to_owned(),
        f if f == f64::NEG_INFINITY => "-Infinity".to_owned(),
        f if f == 0.0 => "0".to_owned(),
        f if f.is_finite() && (f.abs() >= 1e21 || f.abs() < 1e-6) => {
            let exp = format!("{f:e}");
            match exp.split_once('e') {
                Some((mantissa, power)) if !power.starts_with('-') => {
                    format!("{mantissa}e+{power}")
                }
                _ => exp,
            }
        }
        f => f.to_string(),
    }
}

/// Percent-encodes one path token.
pub fn encode_token(token: &str) -> String {
    utf8_percent_encode(token, URI_COMPONENT).to_string()
}

/// Serializes a whole command into the `/`-joined path the gateway expects.
///
/// `["SET", "greeting", "hello world"]` becomes `SET/greeting/hello%20world`.
pub fn encode_path(command: &Command) -> String {
    let mut path = encode_token(command.name().as_str());
    for arg in command.params() {
        path.push('/');
        path.push_str(&encode_token(&stringify_arg(arg)));
    }
    path
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Outcome of a best-effort parse of one reply string.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The string was a JSON document.
    Structured(Value),
    /// The string was not JSON and is returned unchanged.
    Verbatim(String),
}

impl Decoded {
    /// Collapses the tag, yielding the parsed value or the original string.
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Structured(v) => v,
            Decoded::Verbatim(s) => Value::String(s),
        }
    }
}

/// Attempts to parse `s` as JSON, keeping it verbatim on failure.
pub fn try_parse(s: String) -> Decoded {
    match serde_json::from_str::<Value>(&s) {
        Ok(v) => Decoded::Structured(v),
        Err(_) => {
            tracing::trace!(len = s.len(), "reply string is not JSON; keeping verbatim");
            Decoded::Verbatim(s)
        }
    }
}

/// Recursively applies [`try_parse`] to every string inside a reply.
///
/// Arrays and objects are walked element by element. A string that parses is
/// replaced by its parsed value, which is not walked again. Numbers, booleans
/// and null pass through.
pub fn decode_value(value: Value) -> Value {
    match value {
        Value::String(s) => try_parse(s).into_value(),
        Value::Array(items) => Value::Array(items.into_iter().map(decode_value).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, decode_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// JavaScript-style truthiness of a reply value.
///
/// Useful for integer replies that signal success as `1` and failure as `0`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
