//! Response envelope handling.
//!
//! The gateway wraps every result in a JSON object keyed by the command token
//! that was sent, e.g. `{"GET": "value"}` or `{"SET": [true, "OK"]}`. Status
//! replies are `[true, message]` and store errors are `[false, message]`; no
//! other reply uses JSON booleans, so the two shapes are unambiguous before
//! post-processing runs.

use serde_json::Value;

use crate::command::CommandName;
use crate::config::ClientConfig;
use crate::transport::GatewayResponse;
use crate::WebdisError;

/// Classification of a raw (not yet post-processed) reply value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus<'a> {
    /// `[true, message]`, e.g. `[true, "OK"]`.
    Ok(&'a str),
    /// `[false, message]`, e.g. `[false, "ERR no such key"]`.
    Err(&'a str),
}

/// Recognises gateway status and error replies.
pub fn status_of(raw: &Value) -> Option<ReplyStatus<'_>> {
    match raw.as_array().map(Vec::as_slice) {
        Some([Value::Bool(true), Value::String(msg)]) => Some(ReplyStatus::Ok(msg)),
        Some([Value::Bool(false), Value::String(msg)]) => Some(ReplyStatus::Err(msg)),
        _ => None,
    }
}

/// Extracts the raw reply for `command` from a JSON envelope body.
pub fn extract(command: &CommandName, body: &[u8]) -> Result<Value, WebdisError> {
    let envelope: Value =
        serde_json::from_slice(body).map_err(|source| WebdisError::InvalidJson { source })?;
    match envelope {
        Value::Object(mut fields) => {
            fields
                .remove(command.as_str())
                .ok_or_else(|| WebdisError::MissingReply {
                    command: command.to_string(),
                })
        }
        _ => Err(WebdisError::MissingReply {
            command: command.to_string(),
        }),
    }
}

/// Turns a 2xx response into the value returned to the caller.
///
/// Parses the envelope, extracts the field for `command`, optionally rejects
/// `[false, message]` replies, and finally runs the configured post-processing
/// hook.
pub fn unwrap_reply(
    config: &ClientConfig,
    command: &CommandName,
    response: &GatewayResponse,
) -> Result<Value, WebdisError> {
    let raw = extract(command, &response.body)?;
    if config.reject_error_replies {
        if let Some(ReplyStatus::Err(message)) = status_of(&raw) {
            return Err(WebdisError::Command {
                command: command.to_string(),
                message: message.to_owned(),
            });
        }
    }
    Ok(config.post_process.apply(raw))
}
