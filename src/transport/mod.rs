//! Request dispatch seam
//!
//! The client builds [`ApiRequest`]s and hands them to a [`Transport`].
//! [`HttpTransport`] talks to a real server; tests plug in a scripted
//! implementation instead.

mod http;

use std::fmt;

use serde_json::Value;

pub use http::HttpTransport;

use crate::Result;

/// HTTP verbs used by the tracking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read; arguments go in the query string.
    Get,
    /// Create or mutate; arguments go in a JSON body.
    Post,
    /// Partial update.
    Patch,
    /// Removal.
    Delete,
}

impl Method {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call to the tracking API, relative to the configured API prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Verb.
    pub method: Method,
    /// Endpoint path, e.g. `experiments/get`.
    pub path: String,
    /// Query parameters; a key may repeat.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Request with no arguments.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Request carrying a JSON body.
    #[must_use]
    pub fn with_body(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(method, path)
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// First query value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Server reply: status code plus decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body; an empty body is `{}`.
    pub body: Value,
}

impl ApiResponse {
    /// Build a response.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// True for 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to a tracking server.
///
/// Implementations report non-2xx replies as ordinary [`ApiResponse`]s;
/// only failures to get a reply at all are errors.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Perform one blocking round trip.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` for connection, TLS or timeout failures and
    /// `Error::Json` for a body that is not valid JSON.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Decode a response body; blank text is treated as `{}`.
pub(crate) fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("experiments/get")
            .query("experiment_id", "7")
            .query_opt("page_token", None::<String>)
            .query_opt("max_results", Some("10"));
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query_value("experiment_id"), Some("7"));
        assert_eq!(request.query_value("page_token"), None);
        assert_eq!(request.query.len(), 2);

        let post = ApiRequest::with_body(Method::Post, "runs/create", json!({"experiment_id": "7"}));
        assert_eq!(post.body, Some(json!({"experiment_id": "7"})));
        assert_eq!(post.method.to_string(), "POST");
    }

    #[test]
    fn test_decode_blank_body() {
        assert_eq!(decode_body("").unwrap(), json!({}));
        assert_eq!(decode_body("  \n").unwrap(), json!({}));
        assert_eq!(decode_body(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(matches!(decode_body("<html>"), Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, json!({})).is_success());
        assert!(!ApiResponse::new(404, json!({})).is_success());
        assert!(!ApiResponse::new(302, json!({})).is_success());
        assert!(!ApiResponse::new(199, json!({})).is_success());
        assert!(ApiResponse::new(299, json!({})).is_success());
        assert!(!ApiResponse::new(300, json!({})).is_success());
    }
}
