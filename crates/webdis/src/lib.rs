//! Client for a Redis-over-HTTP gateway (Webdis).
//!
//! A [`Client`] turns method calls into command arrays, sends each one as a
//! single HTTP request, unwraps the gateway's JSON envelope and decodes the
//! result on a best-effort basis. [`Key`], [`Hash`], [`List`] and [`Set`] are
//! lightweight handles that pin a key name and expose the matching slice of
//! the store's command set.
//!
//! ```no_run
//! # async fn demo() -> Result<(), protocol::WebdisError> {
//! use protocol::ClientConfig;
//! use serde_json::json;
//!
//! let client = webdis::Client::connect(ClientConfig::default())?;
//!
//! let profile = client.hash("user:42");
//! profile.set([("name", json!("Ada")), ("visits", json!(3))]).await?;
//! let all = profile.get_all().await?;
//! assert_eq!(all, json!({"name": "Ada", "visits": 3}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architectural Layer
//!
//! **Client surface.** Wire details live in [`protocol`]; HTTP lives in
//! [`gateway`]. This crate owns the per-client configuration slot, the
//! [`ops::Op`] table mapping typed operations to remote commands, and the
//! handles built on top of it.
//!
//! ## Concurrency
//!
//! Requests are independent futures. Nothing is queued, batched, or retried;
//! concurrent calls on the same key race exactly as the underlying store
//! allows. Use [`Client::request_cancellable`] to stop waiting on a request.

pub mod cancel;
pub mod client;
pub mod handles;
pub mod ops;

pub use cancel::CancellationToken;
pub use client::Client;
pub use handles::{Hash, Key, List, Set};
pub use ops::Op;

pub use protocol::{ClientConfig, Command, ConfigOverrides, WebdisError};
