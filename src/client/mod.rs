//! Tracking client facade
//!
//! One method per REST operation. Every method builds an [`ApiRequest`],
//! dispatches it through the configured [`Transport`], turns a non-2xx
//! reply into `Error::RemoteRequest`, and builds typed entities from the
//! response envelope. List and search methods return a lazy
//! [`Paginated`] collection plus an eager `*_all` variant.
//!
//! ```rust,no_run
//! use mlflow_rest_client::{ClientConfig, TrackingClient};
//!
//! let client = TrackingClient::new(ClientConfig::new("http://localhost:5000")?)?;
//! for experiment in client.search_experiments(None, Default::default(), &[]).iter() {
//!     println!("{}", experiment?.name());
//! }
//! # Ok::<(), mlflow_rest_client::Error>(())
//! ```

mod experiments;
mod model_versions;
mod models;
mod requests;
mod runs;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::entity::raw::RawObject;
use crate::entity::Tag;
use crate::page::{Page, Paginated};
use crate::transport::{ApiRequest, HttpTransport, Method, Transport};
use crate::{Error, Result};

/// Empty tag input for calls that take tags.
pub const NO_TAGS: [(&str, &str); 0] = [];

/// Builds one item from the page envelope and the item object.
type ItemParser<T> = fn(&RawObject<'_>, &RawObject<'_>) -> Result<T>;

/// Typed client for an MLflow-compatible tracking server.
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct TrackingClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for TrackingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingClient")
            .field("base_url", &self.config.base_url())
            .field("transport", &self.transport)
            .finish()
    }
}

impl TrackingClient {
    /// Client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client configured from `MLFLOW_TRACKING_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the tracking URI is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and return the body of a 2xx reply.
    fn call(&self, request: &ApiRequest) -> Result<Value> {
        let response = self.transport.send(request)?;
        if !response.is_success() {
            let err = remote_error(response.status, &response.body);
            tracing::debug!(method = %request.method, path = %request.path, status = response.status, error = %err, "request rejected");
            return Err(err);
        }
        Ok(response.body)
    }

    fn get(&self, request: &ApiRequest) -> Result<Value> {
        self.call(request)
    }

    fn send_json(&self, method: Method, path: &str, body: &impl Serialize) -> Result<Value> {
        self.call(&ApiRequest::with_body(method, path, serde_json::to_value(body)?))
    }

    fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        self.send_json(Method::Post, path, body)
    }

    fn patch(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        self.send_json(Method::Patch, path, body)
    }

    fn delete(&self, path: &str, body: &impl Serialize) -> Result<()> {
        self.send_json(Method::Delete, path, body).map(drop)
    }

    /// Build one entity from the envelope member `key`.
    fn entity<T>(&self, response: &Value, key: &str, parse: fn(&RawObject<'_>) -> Result<T>) -> Result<T> {
        parse(&RawObject::new(key, leaf(response, key)?, self.config.enum_policy())?)
    }

    /// Lazy pagination over `request`, one request per page.
    ///
    /// GET requests carry the cursor and page size in the query string;
    /// everything else carries them in the JSON body.
    fn paginate<T: 'static>(&self, request: ApiRequest, items_key: &'static str, parse: ItemParser<T>) -> Paginated<T> {
        let client = self.clone();
        Paginated::new(move |cursor: Option<&str>| {
            let request = client.page_request(&request, cursor);
            let response = client.call(&request)?;
            parse_page(&response, items_key, client.config.enum_policy(), parse)
        })
    }

    /// [`TrackingClient::paginate`] over a POST search body.
    fn paginate_post<T: 'static>(
        &self,
        path: &str,
        body: &impl Serialize,
        items_key: &'static str,
        parse: ItemParser<T>,
    ) -> Paginated<T> {
        match serde_json::to_value(body) {
            Ok(body) => self.paginate(ApiRequest::with_body(Method::Post, path, body), items_key, parse),
            Err(err) => failed(&err.into()),
        }
    }

    fn page_request(&self, request: &ApiRequest, cursor: Option<&str>) -> ApiRequest {
        let mut request = request.clone();
        let max_results = self.config.max_results();
        match request.method {
            Method::Get => {
                request = request
                    .query("max_results", max_results.to_string())
                    .query_opt("page_token", cursor);
            }
            _ => {
                if let Some(Value::Object(body)) = request.body.as_mut() {
                    body.insert("max_results".to_string(), Value::from(max_results));
                    if let Some(cursor) = cursor {
                        body.insert("page_token".to_string(), Value::from(cursor));
                    }
                }
            }
        }
        request
    }
}

/// Envelope member `key`; absent or null is a validation error.
pub(crate) fn leaf<'a>(response: &'a Value, key: &str) -> Result<&'a Value> {
    response
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| Error::validation(format!("response.{key}"), "missing from response"))
}

/// One page: items under `items_key` (absent means empty) plus the cursor.
pub(crate) fn parse_page<T>(
    response: &Value,
    items_key: &str,
    policy: crate::entity::EnumPolicy,
    parse: ItemParser<T>,
) -> Result<Page<T>> {
    let envelope = RawObject::new("response", response, policy)?;
    let items = envelope
        .list(items_key)?
        .into_iter()
        .map(|(context, item)| parse(&envelope, &RawObject::new(context, item, policy)?))
        .collect::<Result<Vec<_>>>()?;
    let token = envelope.opt_str("next_page_token")?.map(str::to_string);
    Ok(Page::new(items, token))
}

/// Collection whose every fetch reports `err`, keeping its kind.
fn failed<T: 'static>(err: &Error) -> Paginated<T> {
    let err = Arc::new(err.replicate());
    Paginated::new(move |_: Option<&str>| Err(err.replicate()))
}

/// Reject an empty tag key before it reaches the server.
pub(crate) fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("tag key must not be empty".to_string()));
    }
    Ok(())
}

/// Map an error reply to `Error::RemoteRequest`.
fn remote_error(status: u16, body: &Value) -> Error {
    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
    Error::RemoteRequest {
        status,
        error_code: field("error_code").unwrap_or_default(),
        message: field("message").unwrap_or_else(|| body.to_string()),
    }
}

/// MLflow run ids are 32-char lowercase hex; any UUID spelling is
/// converted, other ids pass through.
pub(crate) fn normalize_run_id(run_id: &str) -> Result<String> {
    let run_id = run_id.trim();
    if run_id.is_empty() {
        return Err(Error::InvalidInput("run id must not be empty".to_string()));
    }
    Ok(uuid::Uuid::parse_str(run_id).map_or_else(|_| run_id.to_string(), |uuid| uuid.simple().to_string()))
}

/// Caller tag pairs to wire tags.
pub(crate) fn collect_tags<I, K, V>(tags: I) -> Result<Vec<Tag>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    tags.into_iter().map(|(key, value)| Tag::new(key, value)).collect()
}
