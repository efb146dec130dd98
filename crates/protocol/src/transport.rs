//! The `Transport` port and the pure request-building half of the pipeline.
//!
//! Every command follows the same path:
//!
//! ```text
//! Command ──build_request──▶ GatewayRequest ──Transport::send──▶ GatewayResponse
//!         ──check_status──▶ 2xx response ──unwrap_reply──▶ decoded value
//! ```
//!
//! Only [`Transport::send`] performs I/O. It is implemented over HTTP by the
//! `gateway` crate and by in-memory fakes in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::Command;
use crate::config::{BasicAuth, ClientConfig, HttpMethod};
use crate::WebdisError;

/// Content type of a binary upload body.
pub const OCTET_STREAM: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A fully resolved HTTP request, ready to hand to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
    /// Credentials to attach, already filtered by the credentials mode.
    pub basic_auth: Option<BasicAuth>,
    /// Maximum time to wait for the full response.
    pub timeout: Option<Duration>,
}

/// The raw HTTP response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase for the status (may be empty).
    pub status_text: String,
    /// Response headers, names lower-cased. Repeated headers are joined with
    /// `, ` in the order received.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl GatewayResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Delivers one request to the gateway and returns its response.
///
/// Implementations must return `Ok` for every response that was received,
/// whatever its status; status checking is done by [`check_status`]. `Err` is
/// reserved for requests that produced no response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response.
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, WebdisError>;
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Resolves a command into an HTTP request under `config`.
///
/// - `POST`: the encoded path is the body; the URL is the endpoint.
/// - `GET`: the encoded path is appended to the endpoint.
/// - A trailing binary parameter forces `PUT`: the remaining tokens form the
///   URL path and the payload is sent as an `application/octet-stream` body.
///
/// `endpoint` overrides [`ClientConfig::endpoint`] for this request only.
pub fn build_request(
    config: &ClientConfig,
    command: Command,
    endpoint: Option<&str>,
) -> Result<GatewayRequest, WebdisError> {
    let endpoint = endpoint.unwrap_or(&config.endpoint);
    let (command, payload) = command.split_payload()?;
    let path = config.pre_process.apply(&command);
    let mut headers = config.headers.clone();

    let (method, url, body) = match payload {
        Some(bytes) => {
            headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
            headers.insert("Content-Type".to_owned(), OCTET_STREAM.to_owned());
            (HttpMethod::Put, join_url(endpoint, &path), Some(bytes))
        }
        None => match config.method {
            HttpMethod::Get => (HttpMethod::Get, join_url(endpoint, &path), None),
            HttpMethod::Post | HttpMethod::Put => {
                (HttpMethod::Post, endpoint.to_owned(), Some(path.into_bytes()))
            }
        },
    };

    let basic_auth = config
        .auth
        .clone()
        .filter(|_| config.sends_credentials_to(&url));

    Ok(GatewayRequest {
        method,
        url,
        headers,
        body,
        basic_auth,
        timeout: config.timeout,
    })
}

/// Appends a command path to an endpoint with exactly one `/` between them.
fn join_url(endpoint: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if endpoint.ends_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

/// Passes 2xx responses through and turns anything else into
/// [`WebdisError::HttpStatus`], keeping the response for inspection.
pub fn check_status(response: GatewayResponse) -> Result<GatewayResponse, WebdisError> {
    if response.is_success() {
        return Ok(response);
    }
    tracing::warn!(
        status = response.status,
        status_text = %response.status_text,
        "gateway returned a non-success status"
    );
    Err(WebdisError::HttpStatus {
        status: response.status,
        status_text: response.status_text.clone(),
        response: Box::new(response),
    })
}
