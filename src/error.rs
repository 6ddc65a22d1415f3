//! Error types for the tracking client
//!
//! Callers can tell a bad payload shape (`Validation`, `UnknownEnumValue`)
//! apart from a request the server rejected (`RemoteRequest`).

use serde::de::Error as _;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Server error code for a missing resource.
pub const RESOURCE_DOES_NOT_EXIST: &str = "RESOURCE_DOES_NOT_EXIST";

/// Server error code for a name collision on create/rename.
pub const RESOURCE_ALREADY_EXISTS: &str = "RESOURCE_ALREADY_EXISTS";

/// Tracking client error types
#[derive(Error, Debug)]
pub enum Error {
    /// Server payload is missing a required field or has it mistyped
    #[error("Validation error at `{context}`: {message}")]
    Validation {
        /// Dotted path of the offending field (e.g. `run.info.run_id`)
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// Stage/status string did not match any member
    #[error("Unknown {kind} value: {value:?}")]
    UnknownEnumValue {
        /// Enumeration name (e.g. `RunStatus`)
        kind: &'static str,
        /// Raw string received
        value: String,
    },

    /// Non-2xx HTTP response
    #[error("Request rejected by server (HTTP {status}): {error_code}: {message}")]
    RemoteRequest {
        /// HTTP status code
        status: u16,
        /// Server-provided error code (e.g. `RESOURCE_DOES_NOT_EXIST`)
        error_code: String,
        /// Server-provided message
        message: String,
    },

    /// Page fetch failed mid-iteration
    #[error("Failed to fetch page {page}: {source}")]
    Pagination {
        /// 1-based index of the page that failed
        page: usize,
        /// Underlying failure
        source: Box<Error>,
    },

    /// Transport failure (connection, TLS, timeout)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Caller passed an invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration is incomplete or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a validation error for the given field path.
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    /// HTTP status of a rejected request, looking through pagination wrappers.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequest { status, .. } => Some(*status),
            Self::Pagination { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Server error code of a rejected request, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::RemoteRequest { error_code, .. } => Some(error_code),
            Self::Pagination { source, .. } => source.error_code(),
            _ => None,
        }
    }

    /// True for a 404 or a `RESOURCE_DOES_NOT_EXIST` response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404) || self.error_code() == Some(RESOURCE_DOES_NOT_EXIST)
    }

    /// True for a `RESOURCE_ALREADY_EXISTS` response.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.error_code() == Some(RESOURCE_ALREADY_EXISTS)
    }

    /// Copy of this error with the same variant and message.
    ///
    /// `reqwest::Error` cannot be rebuilt, so `Http` comes back as
    /// `InvalidInput` carrying its message.
    pub(crate) fn replicate(&self) -> Self {
        match self {
            Self::Validation { context, message } => Self::validation(context.clone(), message.clone()),
            Self::UnknownEnumValue { kind, value } => Self::UnknownEnumValue {
                kind: *kind,
                value: value.clone(),
            },
            Self::RemoteRequest {
                status,
                error_code,
                message,
            } => Self::RemoteRequest {
                status: *status,
                error_code: error_code.clone(),
                message: message.clone(),
            },
            Self::Pagination { page, source } => Self::Pagination {
                page: *page,
                source: Box::new(source.replicate()),
            },
            Self::Http(err) => Self::InvalidInput(err.to_string()),
            Self::Json(err) => Self::Json(serde_json::Error::custom(err.to_string())),
            Self::InvalidInput(message) => Self::InvalidInput(message.clone()),
            Self::Config(message) => Self::Config(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_by_status() {
        let error = Error::RemoteRequest {
            status: 404,
            error_code: "ENDPOINT_NOT_FOUND".to_string(),
            message: "no such endpoint".to_string(),
        };
        assert!(error.is_not_found());
        assert!(!error.is_already_exists());
    }

    #[test]
    fn test_not_found_by_code() {
        let error = Error::RemoteRequest {
            status: 400,
            error_code: RESOURCE_DOES_NOT_EXIST.to_string(),
            message: "Experiment '7' does not exist".to_string(),
        };
        assert!(error.is_not_found());
    }

    #[test]
    fn test_pagination_unwraps_status() {
        let error = Error::Pagination {
            page: 3,
            source: Box::new(Error::RemoteRequest {
                status: 503,
                error_code: "TEMPORARILY_UNAVAILABLE".to_string(),
                message: String::new(),
            }),
        };
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.error_code(), Some("TEMPORARILY_UNAVAILABLE"));
    }

    #[test]
    fn test_replicate_keeps_variant() {
        let json = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let original = Error::from(json);
        let copy = original.replicate();
        assert!(matches!(copy, Error::Json(_)));
        assert!(copy.to_string().contains("key must be a string"));

        let remote = Error::RemoteRequest {
            status: 409,
            error_code: RESOURCE_ALREADY_EXISTS.to_string(),
            message: "taken".to_string(),
        };
        assert!(remote.replicate().is_already_exists());

        let wrapped = Error::Pagination {
            page: 2,
            source: Box::new(Error::validation("run.info", "missing")),
        };
        let copy = wrapped.replicate();
        assert!(matches!(copy, Error::Pagination { page: 2, ref source } if matches!(**source, Error::Validation { .. })));
        assert_eq!(copy.to_string(), wrapped.to_string());
    }
}
