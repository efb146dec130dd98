//! Command arrays: a command name followed by positional parameters.
//!
//! A [`Command`] is built fresh for every call and is not modified once it has
//! been handed to a transport. Parameters are kept as typed [`Arg`]s until the
//! codec serializes them into path tokens, so structured values are only
//! JSON-encoded once, at the edge.

use serde::Serialize;
use serde_json::Value;

use crate::WebdisError;

// ---------------------------------------------------------------------------
// Command name
// ---------------------------------------------------------------------------

/// The first token of a command array, e.g. `"SET"` or `"HGETALL"`.
///
/// The gateway keys its reply envelope by this exact token, so it is kept
/// verbatim (no case normalisation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CommandName(String);

impl CommandName {
    /// Creates a command name, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() { None } else { Some(Self(v)) }
    }

    /// Creates a command name from a compile-time constant.
    ///
    /// Intended for command tables; `value` must not be empty.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(!value.is_empty(), "command names must not be empty");
        Self(value.to_owned())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// One positional command parameter.
///
/// Text and numbers are sent as-is. [`Arg::Json`] values are JSON-encoded when
/// they are arrays, objects or null. [`Arg::Binary`] is only valid as the final
/// parameter, where it becomes the raw request body of an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A plain string parameter.
    Text(String),
    /// An integer parameter.
    Int(i64),
    /// A floating-point parameter.
    Float(f64),
    /// A boolean parameter, sent as `true` / `false`.
    Bool(bool),
    /// A structured parameter.
    Json(Value),
    /// A raw binary payload.
    Binary(Vec<u8>),
}

impl Arg {
    /// Serializes any `Serialize` value into a structured parameter.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, WebdisError> {
        serde_json::to_value(value)
            .map(Arg::Json)
            .map_err(|e| WebdisError::InvalidCommand {
                reason: format!("parameter is not JSON-serializable: {e}"),
            })
    }

    /// Returns `true` for [`Arg::Binary`].
    pub fn is_binary(&self) -> bool {
        matches!(self, Arg::Binary(_))
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_owned())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<&String> for Arg {
    fn from(v: &String) -> Self {
        Arg::Text(v.clone())
    }
}

macro_rules! int_arg {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Int(i64::from(v))
                }
            }
        )*
    };
}

int_arg!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(f64::from(v))
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Json(v)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Arg::Binary(v)
    }
}

impl From<&[u8]> for Arg {
    fn from(v: &[u8]) -> Self {
        Arg::Binary(v.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A command name and its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: CommandName,
    args: Vec<Arg>,
}

impl Command {
    /// Creates a command with no parameters.
    pub fn new(name: CommandName) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Creates a command from a name string, rejecting an empty name.
    pub fn named(name: impl Into<String>) -> Result<Self, WebdisError> {
        CommandName::new(name)
            .map(Self::new)
            .ok_or_else(|| WebdisError::InvalidCommand {
                reason: "command name must not be empty".to_owned(),
            })
    }

    /// Appends one parameter.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several parameters in order.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Inserts `key` as the first parameter, ahead of any already present.
    pub fn with_key_spliced(mut self, key: impl Into<String>) -> Self {
        self.args.insert(0, Arg::Text(key.into()));
        self
    }

    /// The command token.
    pub fn name(&self) -> &CommandName {
        &self.name
    }

    /// The parameters, in order.
    pub fn params(&self) -> &[Arg] {
        &self.args
    }

    /// Detaches a trailing binary parameter to be sent as an upload body.
    ///
    /// Returns the command without the payload, and the payload if there was
    /// one. A binary parameter anywhere but last cannot be represented in the
    /// URL path and is rejected.
    pub fn split_payload(mut self) -> Result<(Self, Option<Vec<u8>>), WebdisError> {
        let payload = match self.args.last() {
            Some(Arg::Binary(_)) => match self.args.pop() {
                Some(Arg::Binary(bytes)) => Some(bytes),
                _ => None,
            },
            _ => None,
        };
        if self.args.iter().any(Arg::is_binary) {
            return Err(WebdisError::InvalidCommand {
                reason: format!(
                    "{}: a binary payload is only allowed as the final parameter",
                    self.name
                ),
            });
        }
        Ok((self, payload))
    }
}
