//! Key handles: a client, a remembered key name, and a narrowed vocabulary.
//!
//! Each handle splices its key in as the first parameter of every command it
//! issues. Handles hold no connection resources; creating and dropping them is
//! free. The only state a handle changes is its own key name, and only
//! [`Key::rename`] / [`Key::rename_nx`] do that.
//!
//! ## Replace-all operations
//!
//! [`Hash::set`], [`List::set_all`] and [`Set::set`] delete the key and then
//! repopulate it with a second request. Concurrent readers may observe the key
//! missing between the two requests, and two concurrent replace-alls on the
//! same key may interleave. No atomicity is provided.

/// Generates the accessors every handle shares.
macro_rules! handle_common {
    ($handle:ident) => {
        impl $handle {
            /// Creates a handle on `key`.
            pub fn new(client: $crate::Client, key: impl Into<String>) -> Self {
                Self {
                    binding: super::Binding::new(client, key),
                }
            }

            /// Sends this handle's requests to `endpoint` instead of the
            /// client's configured endpoint.
            pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
                self.binding.endpoint = Some(endpoint.into());
                self
            }

            /// The key this handle operates on.
            pub fn name(&self) -> &str {
                &self.binding.key
            }

            /// The endpoint override, if any.
            pub fn endpoint(&self) -> Option<&str> {
                self.binding.endpoint.as_deref()
            }
        }
    };
}

mod hash;
mod key;
mod list;
mod set;

pub use hash::Hash;
pub use key::Key;
pub use list::List;
pub use set::Set;

use protocol::{Arg, WebdisError};
use serde_json::Value;

use crate::ops::Op;
use crate::Client;

/// The state shared by every handle type.
#[derive(Debug, Clone)]
struct Binding {
    client: Client,
    key: String,
    endpoint: Option<String>,
}

impl Binding {
    fn new(client: Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
            endpoint: None,
        }
    }

    async fn call(&self, op: Op, params: Vec<Arg>) -> Result<Value, WebdisError> {
        self.client
            .invoke(op, Some(&self.key), params, self.endpoint.as_deref())
            .await
    }
}
