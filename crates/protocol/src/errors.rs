//! Error type shared by every layer of the gateway client.
//!
//! [`WebdisError`] distinguishes the two failure kinds a caller can observe:
//! HTTP-level failures (a non-2xx status, or the request never completing) and
//! failures to make sense of a 2xx reply. Decode fallbacks in
//! [`crate::codec`] are *not* errors: a string that does not parse as JSON is
//! returned verbatim.
//!
//! There is no retry policy. Every error propagates to the immediate caller.

use thiserror::Error;

use crate::transport::GatewayResponse;

/// Errors produced while building, sending, or unwrapping a gateway request.
#[derive(Debug, Error)]
pub enum WebdisError {
    /// The gateway answered with a non-2xx status.
    ///
    /// The full response is kept so callers can inspect headers and body.
    #[error("Gateway returned HTTP {status}: {status_text}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical reason phrase for `status` (may be empty).
        status_text: String,
        /// The original response, for inspection.
        response: Box<GatewayResponse>,
    },

    /// The request could not be delivered or its response could not be read
    /// (connection refused, timeout, TLS failure, ...).
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The response body was not a JSON document, or the reply did not have
    /// the shape the caller asked for.
    #[error("Gateway reply could not be decoded: {source}")]
    InvalidJson {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The JSON envelope had no field named after the command.
    #[error("Gateway reply has no '{command}' field")]
    MissingReply {
        /// The command token the envelope was expected to be keyed by.
        command: String,
    },

    /// The store rejected the command; the gateway reported `[false, message]`.
    ///
    /// Only produced when `ClientConfig::reject_error_replies` is set.
    #[error("{command} failed: {message}")]
    Command {
        /// The command token that failed.
        command: String,
        /// Error text reported by the store (e.g. `"ERR no such key"`).
        message: String,
    },

    /// The command could not be turned into a request.
    #[error("Invalid command: {reason}")]
    InvalidCommand {
        /// What is wrong with the command.
        reason: String,
    },

    /// A configuration value could not be parsed or applied.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The caller cancelled the request before a reply arrived.
    ///
    /// The network request itself may still complete on the gateway.
    #[error("Request cancelled")]
    Cancelled,
}

impl WebdisError {
    /// Returns the original response if this is an [`WebdisError::HttpStatus`] error.
    pub fn response(&self) -> Option<&GatewayResponse> {
        match self {
            Self::HttpStatus { response, .. } => Some(&**response),
            _ => None,
        }
    }
}
