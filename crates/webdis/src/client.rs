//! The client: one configuration, one transport, one request pipeline.

use std::sync::Arc;

use parking_lot::RwLock;
use protocol::{
    build_request, check_status, unwrap_reply, Arg, ClientConfig, Command, ConfigOverrides,
    Transport, WebdisError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cancel::CancellationToken;
use crate::handles::{Hash, Key, List, Set};
use crate::ops::Op;

/// A gateway client.
///
/// Cloning is cheap and clones share both the transport and the configuration
/// slot, so [`Client::configure`] on any clone affects them all, including
/// handles created earlier. Each request snapshots the configuration when it
/// starts; a request already in flight keeps the settings it started with.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: RwLock<Arc<ClientConfig>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &*self.inner.config.read())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client over an arbitrary transport.
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self, WebdisError> {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Creates a client over a transport shared with other clients.
    pub fn with_shared_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, WebdisError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                config: RwLock::new(Arc::new(config)),
            }),
        })
    }

    /// Creates a client that talks HTTP to the configured endpoint.
    pub fn connect(config: ClientConfig) -> Result<Self, WebdisError> {
        Self::new(config, gateway::HttpTransport::new()?)
    }

    /// Creates an HTTP client configured from `WEBDIS_*` environment variables.
    pub fn from_env() -> Result<Self, WebdisError> {
        Self::connect(ClientConfig::from_env()?)
    }

    /// The active configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.inner.config.read())
    }

    /// Replaces the active configuration with the defaults plus `overrides`.
    ///
    /// Settings from any earlier `configure` call are discarded. On error the
    /// active configuration is left unchanged.
    pub fn configure(&self, overrides: ConfigOverrides) -> Result<Arc<ClientConfig>, WebdisError> {
        let config = Arc::new(ClientConfig::with_overrides(overrides)?);
        *self.inner.config.write() = Arc::clone(&config);
        debug!(method = %config.method, endpoint = %config.endpoint, "client reconfigured");
        Ok(config)
    }

    // -----------------------------------------------------------------------
    // Request pipeline
    // -----------------------------------------------------------------------

    /// Sends `command` to the configured endpoint and returns the decoded reply.
    pub async fn request(&self, command: Command) -> Result<Value, WebdisError> {
        self.request_at(command, None).await
    }

    /// Sends `command`, optionally to a different endpoint than the configured one.
    #[instrument(level = "debug", skip_all, fields(command = %command.name()))]
    pub async fn request_at(
        &self,
        command: Command,
        endpoint: Option<&str>,
    ) -> Result<Value, WebdisError> {
        let config = self.config();
        let name = command.name().clone();
        let request = build_request(&config, command, endpoint)?;
        let response = check_status(self.inner.transport.send(request).await?)?;
        unwrap_reply(&config, &name, &response)
    }

    /// Like [`Client::request_at`], but gives up as soon as `token` is cancelled.
    ///
    /// If the token is already cancelled nothing is sent.
    pub async fn request_cancellable(
        &self,
        command: Command,
        endpoint: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Value, WebdisError> {
        let name = command.name().clone();
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(command = %name, "request cancelled");
                Err(WebdisError::Cancelled)
            }
            reply = self.request_at(command, endpoint) => reply,
        }
    }

    /// Sends `command` and deserializes the decoded reply into `T`.
    pub async fn request_as<T: DeserializeOwned>(&self, command: Command) -> Result<T, WebdisError> {
        let value = self.request(command).await?;
        serde_json::from_value(value).map_err(|source| WebdisError::InvalidJson { source })
    }

    /// Runs one operation from the [`Op`] table.
    pub async fn invoke(
        &self,
        op: Op,
        key: Option<&str>,
        params: Vec<Arg>,
        endpoint: Option<&str>,
    ) -> Result<Value, WebdisError> {
        self.request_at(op.to_command(key, params), endpoint).await
    }

    // -----------------------------------------------------------------------
    // Server-wide commands
    // -----------------------------------------------------------------------

    /// `ECHO`: the message as the server returns it (after decoding).
    pub async fn echo(&self, message: impl Into<Arg>) -> Result<Value, WebdisError> {
        self.invoke(Op::Echo, None, vec![message.into()], None).await
    }

    /// `MGET`: the values of `keys`, `null` for missing keys.
    pub async fn mget<I, K>(&self, keys: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<Arg>,
    {
        self.invoke(Op::MultiGet, None, collect_args(keys), None).await
    }

    /// `MSET`: sets every `(key, value)` pair.
    pub async fn mset<I, K, V>(&self, pairs: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        self.invoke(Op::MultiSet, None, pair_args(pairs), None).await
    }

    /// `MSETNX`: sets every pair only if none of the keys exist.
    pub async fn msetnx<I, K, V>(&self, pairs: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        self.invoke(Op::MultiSetIfAbsent, None, pair_args(pairs), None).await
    }

    /// `DEL`: the number of keys removed.
    pub async fn del<I, K>(&self, keys: I) -> Result<Value, WebdisError>
    where
        I: IntoIterator<Item = K>,
        K: Into<Arg>,
    {
        self.invoke(Op::Delete, None, collect_args(keys), None).await
    }

    /// `KEYS pattern`.
    pub async fn keys_matching(&self, pattern: &str) -> Result<Value, WebdisError> {
        self.invoke(Op::KeysMatching, None, vec![pattern.into()], None).await
    }

    /// `KEYS *`.
    pub async fn keys(&self) -> Result<Value, WebdisError> {
        self.keys_matching("*").await
    }

    /// `RANDOMKEY`.
    pub async fn random_key(&self) -> Result<Value, WebdisError> {
        self.invoke(Op::RandomKey, None, Vec::new(), None).await
    }

    /// `SELECT index`.
    ///
    /// The gateway may run each request on a different store connection, so
    /// the selection is not guaranteed to stick across requests.
    pub async fn select(&self, index: i64) -> Result<Value, WebdisError> {
        self.invoke(Op::SelectDb, None, vec![index.into()], None).await
    }

    // -----------------------------------------------------------------------
    // Handles
    // -----------------------------------------------------------------------

    /// A handle on a string-valued (or any) key.
    pub fn key(&self, key: impl Into<String>) -> Key {
        Key::new(self.clone(), key)
    }

    /// A handle on a hash.
    pub fn hash(&self, key: impl Into<String>) -> Hash {
        Hash::new(self.clone(), key)
    }

    /// A handle on a list.
    pub fn list(&self, key: impl Into<String>) -> List {
        List::new(self.clone(), key)
    }

    /// A handle on a set.
    pub fn set(&self, key: impl Into<String>) -> Set {
        Set::new(self.clone(), key)
    }
}

pub(crate) fn collect_args<I, A>(items: I) -> Vec<Arg>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    items.into_iter().map(Into::into).collect()
}

/// Flattens `(field, value)` pairs into `field value field value ...`.
pub(crate) fn pair_args<I, K, V>(pairs: I) -> Vec<Arg>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Arg>,
{
    pairs
        .into_iter()
        .flat_map(|(k, v)| [Arg::Text(k.into()), v.into()])
        .collect()
}
