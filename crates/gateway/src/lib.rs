//! Webdis HTTP transport adapter.
//!
//! Implements the [`protocol::Transport`] trait over HTTP/1.1 with `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, TLS, header mapping and timeouts
//! live here. The [`protocol`] crate sees only [`protocol::Transport`]; it
//! decides the method, URL, headers and body before a request reaches this
//! crate.
//!
//! Non-2xx responses are returned as `Ok`: status checking belongs to the
//! protocol pipeline so that the error can carry the full response.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use protocol::{GatewayRequest, GatewayResponse, HttpMethod, Transport, WebdisError};
use tracing::debug;

/// [`Transport`] implementation backed by a shared `reqwest::Client`.
///
/// Cloning is cheap; clones share the connection pool of the inner client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new() -> Result<Self, WebdisError> {
        Self::builder().build()
    }

    /// Starts building a transport with non-default client settings.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Wraps an existing `reqwest` client, e.g. one with custom TLS roots.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportBuilder {
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Limits the time spent establishing a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Builds the transport.
    pub fn build(self) -> Result<HttpTransport, WebdisError> {
        let mut builder = reqwest::Client::builder().user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("webdis-rs/", env!("CARGO_PKG_VERSION")).to_owned()),
        );
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| WebdisError::ConfigurationError {
            message: format!("could not build HTTP client: {e}"),
        })?;
        Ok(HttpTransport { client })
    }
}

fn method_of(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
    }
}

fn transport_error(e: reqwest::Error) -> WebdisError {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_builder() {
        "invalid request"
    } else {
        "request failed"
    };
    WebdisError::Transport {
        message: format!("{kind}: {e}"),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, WebdisError> {
        debug!(
            method = %request.method,
            url = %request.url,
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "sending gateway request"
        );

        let mut builder = self
            .client
            .request(method_of(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(auth) = &request.basic_auth {
            builder = builder.basic_auth(&auth.username, auth.password.as_ref());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_owned())
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(value);
                })
                .or_insert_with(|| value.to_owned());
        }
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        debug!(status = status.as_u16(), body_len = body.len(), "gateway responded");

        Ok(GatewayResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        })
    }
}
