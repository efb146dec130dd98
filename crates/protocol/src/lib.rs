//! Wire protocol for a Redis-over-HTTP gateway (Webdis).
//!
//! This crate contains everything about talking to the gateway that does not
//! perform I/O: command arrays, the value codec, configuration, request
//! resolution, and envelope unwrapping. Sending bytes is delegated to the
//! [`Transport`] port, implemented over HTTP by the `gateway` crate.
//!
//! ## Architectural Layer
//!
//! **Protocol + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is sent and how replies are read; infrastructure crates
//! define *how* bytes move.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`command`] | `Command`, `CommandName`, `Arg` |
//! | [`codec`] | Parameter stringification, path encoding, best-effort reply decoding |
//! | [`config`] | `ClientConfig`, `ConfigOverrides`, processing hooks |
//! | [`transport`] | `Transport` port, `GatewayRequest`/`GatewayResponse`, request building |
//! | [`reply`] | Envelope unwrapping and status/error reply classification |
//! | [`errors`] | `WebdisError` |

pub mod codec;
pub mod command;
pub mod config;
pub mod errors;
pub mod reply;
pub mod transport;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use codec::{decode_value, encode_path, is_truthy, try_parse, Decoded};
pub use command::{Arg, Command, CommandName};
pub use config::{
    BasicAuth, ClientConfig, ConfigOverrides, CredentialsMode, HttpMethod, PostProcess,
    PreProcess, DEFAULT_ENDPOINT,
};
pub use errors::WebdisError;
pub use reply::{unwrap_reply, ReplyStatus};
pub use transport::{build_request, check_status, GatewayRequest, GatewayResponse, Transport};
