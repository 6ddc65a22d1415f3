//! Client configuration
//!
//! ```rust
//! use mlflow_rest_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder("https://mlflow.example.com")
//!     .bearer_token("secret")
//!     .timeout(Duration::from_secs(30))
//!     .max_results(500)
//!     .build()?;
//! assert_eq!(config.endpoint_url("runs/get"), "https://mlflow.example.com/api/2.0/mlflow/runs/get");
//! # Ok::<(), mlflow_rest_client::Error>(())
//! ```

use std::fmt;
use std::time::Duration;

use crate::entity::EnumPolicy;
use crate::{Error, Result};

/// Default REST prefix of the tracking API.
pub const DEFAULT_API_PREFIX: &str = "api/2.0/mlflow";

/// Default page size for list and search calls.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP basic authentication.
    Basic {
        /// User name.
        user: String,
        /// Password.
        password: String,
    },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Connection settings for a tracking server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_prefix: String,
    auth: Option<Auth>,
    ignore_ssl_check: bool,
    timeout: Option<Duration>,
    enum_policy: EnumPolicy,
    max_results: u32,
}

impl ClientConfig {
    /// Start building a configuration for the server at `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }

    /// Configuration with every setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `base_url` is not an http(s) URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Read the standard `MLFLOW_TRACKING_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `MLFLOW_TRACKING_URI` is unset or invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `MLFLOW_TRACKING_URI` is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let uri = var("MLFLOW_TRACKING_URI")
            .ok_or_else(|| Error::Config("MLFLOW_TRACKING_URI is not set".to_string()))?;
        let mut builder = Self::builder(uri);

        if let (Some(user), Some(password)) = (var("MLFLOW_TRACKING_USERNAME"), var("MLFLOW_TRACKING_PASSWORD")) {
            builder = builder.basic_auth(user, password);
        } else if let Some(token) = var("MLFLOW_TRACKING_TOKEN") {
            builder = builder.bearer_token(token);
        }
        if let Some(insecure) = var("MLFLOW_TRACKING_INSECURE_TLS") {
            builder = builder.ignore_ssl_check(parse_flag(&insecure));
        }
        builder.build()
    }

    /// Server root URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST prefix between the root URL and the endpoint path.
    #[must_use]
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Credentials, if any.
    #[must_use]
    pub const fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    /// Whether TLS certificate verification is disabled.
    #[must_use]
    pub const fn ignore_ssl_check(&self) -> bool {
        self.ignore_ssl_check
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Policy for stage/status strings outside the known set.
    #[must_use]
    pub const fn enum_policy(&self) -> EnumPolicy {
        self.enum_policy
    }

    /// Page size sent to list and search endpoints.
    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Full URL of an endpoint path such as `runs/get`.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.api_prefix.is_empty() {
            format!("{}/{path}", self.base_url)
        } else {
            format!("{}/{}/{path}", self.base_url, self.api_prefix)
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ClientConfigBuilder {
    base_url: String,
    api_prefix: String,
    auth: Option<Auth>,
    ignore_ssl_check: bool,
    timeout: Option<Duration>,
    enum_policy: EnumPolicy,
    max_results: u32,
}

impl ClientConfigBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            auth: None,
            ignore_ssl_check: false,
            timeout: None,
            enum_policy: EnumPolicy::Strict,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// REST prefix, e.g. `api/2.0/preview/mlflow` for old servers.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Use HTTP basic authentication.
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Auth::Basic {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Use a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Auth::Bearer(token.into()));
        self
    }

    /// Skip TLS certificate verification.
    pub const fn ignore_ssl_check(mut self, ignore: bool) -> Self {
        self.ignore_ssl_check = ignore;
        self
    }

    /// Per-request timeout.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Policy for unknown stage/status strings.
    pub const fn enum_policy(mut self, policy: EnumPolicy) -> Self {
        self.enum_policy = policy;
        self
    }

    /// Page size for list and search calls.
    pub const fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the URL is not http(s) or the page size
    /// is zero.
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "tracking URI must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.max_results == 0 {
            return Err(Error::Config("max_results must be positive".to_string()));
        }

        Ok(ClientConfig {
            base_url,
            api_prefix: self.api_prefix.trim_matches('/').to_string(),
            auth: self.auth,
            ignore_ssl_check: self.ignore_ssl_check,
            timeout: self.timeout,
            enum_policy: self.enum_policy,
            max_results: self.max_results,
        })
    }
}
