//! Client configuration.
//!
//! A [`ClientConfig`] is an explicit value owned by each client; there is no
//! process-wide settings object. Reconfiguration is expressed as a set of
//! [`ConfigOverrides`] applied on top of the *defaults*, so every configure
//! call replaces the whole active configuration rather than patching it.
//!
//! ## Defaults
//!
//! | Setting | Default |
//! |---------|---------|
//! | method | `POST` (command path in the body) |
//! | endpoint | [`DEFAULT_ENDPOINT`] |
//! | headers | `Accept` and `Content-Type` set to `application/json` |
//! | credentials | [`CredentialsMode::SameOrigin`] |
//! | pre-processing | [`crate::codec::encode_path`] |
//! | post-processing | [`crate::codec::decode_value`] |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::codec;
use crate::command::Command;
use crate::WebdisError;

/// Where the gateway listens when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:7379/";

/// Prefix shared by every environment variable read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "WEBDIS_";

// ---------------------------------------------------------------------------
// Enumerated settings
// ---------------------------------------------------------------------------

/// HTTP method used to deliver a command.
///
/// POST is recommended for production because GET responses may be cached by
/// intermediaries. `PUT` is never configured directly; it is selected per
/// request when the command carries a binary upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Command path appended to the endpoint URL.
    Get,
    /// Command path sent as the request body.
    #[default]
    Post,
    /// Binary upload; path in the URL, payload in the body.
    Put,
}

impl HttpMethod {
    /// The method token as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = WebdisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            other => Err(WebdisError::ConfigurationError {
                message: format!("unsupported HTTP method '{other}'"),
            }),
        }
    }
}

/// When configured credentials are attached to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsMode {
    /// Never send credentials.
    Omit,
    /// Send credentials only to the configured endpoint's origin.
    #[default]
    SameOrigin,
    /// Always send credentials, including to endpoint overrides on other origins.
    Include,
}

/// HTTP basic-auth credentials for a gateway with ACLs enabled.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password, if the user has one.
    pub password: Option<String>,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Processing hooks
// ---------------------------------------------------------------------------

/// Turns a command into the URL path (or POST body) sent to the gateway.
#[derive(Clone)]
pub struct PreProcess(Arc<dyn Fn(&Command) -> String + Send + Sync>);

impl PreProcess {
    /// Wraps a custom path encoder.
    pub fn new(f: impl Fn(&Command) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the hook.
    pub fn apply(&self, command: &Command) -> String {
        (self.0)(command)
    }
}

impl Default for PreProcess {
    fn default() -> Self {
        Self::new(codec::encode_path)
    }
}

impl std::fmt::Debug for PreProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PreProcess(..)")
    }
}

/// Transforms the unwrapped reply value before it is returned to the caller.
#[derive(Clone)]
pub struct PostProcess(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl PostProcess {
    /// Wraps a custom reply decoder.
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A decoder that returns replies exactly as the gateway sent them.
    pub fn identity() -> Self {
        Self::new(|v| v)
    }

    /// Runs the hook.
    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl Default for PostProcess {
    fn default() -> Self {
        Self::new(codec::decode_value)
    }
}

impl std::fmt::Debug for PostProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PostProcess(..)")
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// The complete set of settings used to issue requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How commands are delivered: path in the URL (`GET`) or in the body (`POST`).
    pub method: HttpMethod,
    /// Base URL of the gateway. GET requests append the command path to it.
    pub endpoint: String,
    /// Headers sent with every command request.
    pub headers: BTreeMap<String, String>,
    /// When [`ClientConfig::auth`] is attached.
    pub credentials: CredentialsMode,
    /// Basic-auth credentials, if the gateway requires them.
    pub auth: Option<BasicAuth>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Turn `[false, "message"]` gateway replies into [`WebdisError::Command`].
    pub reject_error_replies: bool,
    /// Command → path encoder.
    pub pre_process: PreProcess,
    /// Reply decoder.
    pub post_process: PostProcess,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_owned(), "application/json".to_owned());
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        Self {
            method: HttpMethod::Post,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            headers,
            credentials: CredentialsMode::SameOrigin,
            auth: None,
            timeout: None,
            reject_error_replies: true,
            pre_process: PreProcess::default(),
            post_process: PostProcess::default(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the defaults plus `overrides`.
    ///
    /// Settings not named in `overrides` take their *default* value, not the
    /// value of any previously active configuration.
    pub fn with_overrides(overrides: ConfigOverrides) -> Result<Self, WebdisError> {
        let mut config = Self::default();
        if let Some(method) = overrides.method {
            config.method = method;
        }
        if let Some(endpoint) = overrides.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(headers) = overrides.headers {
            config.headers = headers;
        }
        if let Some(credentials) = overrides.credentials {
            config.credentials = credentials;
        }
        if overrides.auth.is_some() {
            config.auth = overrides.auth;
        }
        if let Some(ms) = overrides.timeout_ms {
            config.timeout = Some(Duration::from_millis(ms));
        }
        if let Some(reject) = overrides.reject_error_replies {
            config.reject_error_replies = reject;
        }
        if let Some(pre) = overrides.pre_process {
            config.pre_process = pre;
        }
        if let Some(post) = overrides.post_process {
            config.post_process = post;
        }
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from `WEBDIS_*` environment variables.
    ///
    /// See [`ClientConfig::from_lookup`] for the variables read.
    pub fn from_env() -> Result<Self, WebdisError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from a variable lookup function.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `WEBDIS_URL` | endpoint |
    /// | `WEBDIS_METHOD` | `GET` or `POST` |
    /// | `WEBDIS_USERNAME` | basic-auth user |
    /// | `WEBDIS_PASSWORD` | basic-auth password (requires a user) |
    /// | `WEBDIS_TIMEOUT_MS` | request timeout in milliseconds |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WebdisError> {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        let mut overrides = ConfigOverrides {
            endpoint: var("URL"),
            ..ConfigOverrides::default()
        };
        if let Some(method) = var("METHOD") {
            overrides.method = Some(method.parse()?);
        }
        if let Some(ms) = var("TIMEOUT_MS") {
            let ms = ms.trim().parse::<u64>().map_err(|e| WebdisError::ConfigurationError {
                message: format!("{ENV_PREFIX}TIMEOUT_MS: {e}"),
            })?;
            overrides.timeout_ms = Some(ms);
        }
        overrides.auth = match (var("USERNAME"), var("PASSWORD")) {
            (Some(username), password) => Some(BasicAuth { username, password }),
            (None, Some(_)) => {
                return Err(WebdisError::ConfigurationError {
                    message: format!("{ENV_PREFIX}PASSWORD is set without {ENV_PREFIX}USERNAME"),
                })
            }
            (None, None) => None,
        };

        Self::with_overrides(overrides)
    }

    /// Checks the settings that cannot be enforced by the type system.
    pub fn validate(&self) -> Result<(), WebdisError> {
        if self.endpoint.is_empty() {
            return Err(WebdisError::ConfigurationError {
                message: "endpoint must not be empty".to_owned(),
            });
        }
        if self.method == HttpMethod::Put {
            return Err(WebdisError::ConfigurationError {
                message: "PUT is reserved for binary uploads; configure GET or POST".to_owned(),
            });
        }
        Ok(())
    }

    /// Whether credentials should accompany a request to `target`.
    pub fn sends_credentials_to(&self, target: &str) -> bool {
        match self.credentials {
            CredentialsMode::Omit => false,
            CredentialsMode::Include => true,
            CredentialsMode::SameOrigin => match Url::parse(target) {
                Ok(target) => Url::parse(&self.endpoint)
                    .is_ok_and(|endpoint| endpoint.origin() == target.origin()),
                // A relative target resolves against the endpoint.
                Err(url::ParseError::RelativeUrlWithoutBase) => true,
                Err(_) => false,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigOverrides
// ---------------------------------------------------------------------------

/// Partial settings applied on top of the defaults by
/// [`ClientConfig::with_overrides`].
///
/// Deserializable so that applications can keep gateway settings in their own
/// configuration files; the processing hooks can only be set in code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// HTTP method (`"GET"` or `"POST"`).
    pub method: Option<HttpMethod>,
    /// Gateway base URL.
    pub endpoint: Option<String>,
    /// Complete replacement header set.
    pub headers: Option<BTreeMap<String, String>>,
    /// Credentials mode (`"omit"`, `"same-origin"`, `"include"`).
    pub credentials: Option<CredentialsMode>,
    /// Basic-auth credentials.
    pub auth: Option<BasicAuth>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Whether gateway error replies become errors.
    pub reject_error_replies: Option<bool>,
    /// Custom command encoder.
    #[serde(skip)]
    pub pre_process: Option<PreProcess>,
    /// Custom reply decoder.
    #[serde(skip)]
    pub post_process: Option<PostProcess>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn defaults_post_json_to_local_gateway() {
        let config = ClientConfig::default();
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.credentials, CredentialsMode::SameOrigin);
        assert_eq!(config.headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert!(config.reject_error_replies);
    }

    #[test]
    fn overrides_start_from_defaults_each_time() {
        let first = ClientConfig::with_overrides(ConfigOverrides {
            method: Some(HttpMethod::Get),
            endpoint: Some("http://gw:7379/".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(first.method, HttpMethod::Get);

        // A second configuration that names only the endpoint does not keep GET.
        let second = ClientConfig::with_overrides(ConfigOverrides {
            endpoint: Some("http://other:7379/".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(second.method, HttpMethod::Post);
        assert_eq!(second.endpoint, "http://other:7379/");
    }

    #[test]
    fn overrides_deserialize_from_json() {
        let overrides: ConfigOverrides = serde_json::from_value(json!({
            "method": "GET",
            "credentials": "include",
            "timeout_ms": 1500,
            "auth": {"username": "app", "password": "s3cret"}
        }))
        .unwrap();
        let config = ClientConfig::with_overrides(overrides).unwrap();

        assert_eq!(config.method, HttpMethod::Get);
        assert_eq!(config.credentials, CredentialsMode::Include);
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.auth.as_ref().map(|a| a.username.as_str()), Some("app"));
    }

    #[test]
    fn put_and_empty_endpoint_are_rejected() {
        let put = ClientConfig::with_overrides(ConfigOverrides {
            method: Some(HttpMethod::Put),
            ..Default::default()
        });
        assert!(matches!(put, Err(WebdisError::ConfigurationError { .. })));

        let empty = ClientConfig::with_overrides(ConfigOverrides {
            endpoint: Some(String::new()),
            ..Default::default()
        });
        assert!(matches!(empty, Err(WebdisError::ConfigurationError { .. })));
    }

    #[test]
    fn environment_lookup_builds_config() {
        let vars: HashMap<&str, &str> = [
            ("WEBDIS_URL", "https://cache.internal:7379/"),
            ("WEBDIS_METHOD", "get"),
            ("WEBDIS_USERNAME", "reader"),
            ("WEBDIS_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.endpoint, "https://cache.internal:7379/");
        assert_eq!(config.method, HttpMethod::Get);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert_eq!(
            config.auth,
            Some(BasicAuth {
                username: "reader".to_owned(),
                password: None
            })
        );
    }

    #[test]
    fn environment_lookup_rejects_bad_values() {
        let bad_method = ClientConfig::from_lookup(|k| {
            (k == "WEBDIS_METHOD").then(|| "DELETE".to_owned())
        });
        assert!(matches!(bad_method, Err(WebdisError::ConfigurationError { .. })));

        let orphan_password = ClientConfig::from_lookup(|k| {
            (k == "WEBDIS_PASSWORD").then(|| "pw".to_owned())
        });
        assert!(matches!(orphan_password, Err(WebdisError::ConfigurationError { .. })));
    }

    #[test]
    fn credentials_follow_mode_and_origin() {
        let mut config = ClientConfig::with_overrides(ConfigOverrides {
            endpoint: Some("http://gw.local:7379/".to_owned()),
            ..Default::default()
        })
        .unwrap();

        assert!(config.sends_credentials_to("http://gw.local:7379/GET/k"));
        assert!(config.sends_credentials_to("HTTP://GW.LOCAL:7379"));
        assert!(!config.sends_credentials_to("http://elsewhere:7379/"));
        assert!(!config.sends_credentials_to("https://gw.local:7379/"));
        assert!(config.sends_credentials_to("GET/k"));

        config.credentials = CredentialsMode::Include;
        assert!(config.sends_credentials_to("http://elsewhere:7379/"));

        config.credentials = CredentialsMode::Omit;
        assert!(!config.sends_credentials_to("http://gw.local:7379/"));
    }

    #[test]
    fn same_origin_ignores_default_ports_and_userinfo() {
        let config = ClientConfig::with_overrides(ConfigOverrides {
            endpoint: Some("http://gw.local/".to_owned()),
            ..Default::default()
        })
        .unwrap();

        assert!(config.sends_credentials_to("http://gw.local:80/GET/k"));
        assert!(config.sends_credentials_to("http://user@gw.local/GET/k"));
        assert!(!config.sends_credentials_to("http://gw.local:8080/GET/k"));

        let tls = ClientConfig::with_overrides(ConfigOverrides {
            endpoint: Some("https://gw.local:443".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert!(tls.sends_credentials_to("https://gw.local/"));
    }

    #[test]
    fn password_is_redacted_from_debug_output() {
        let auth = BasicAuth {
            username: "app".to_owned(),
            password: Some("hunter2".to_owned()),
        };
        let printed = format!("{auth:?}");
        assert!(printed.contains("app"));
        assert!(!printed.contains("hunter2"));
    }
}
