//! Blocking HTTP transport over `reqwest`

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::json;

use super::{decode_body, ApiRequest, ApiResponse, Method, Transport};
use crate::config::{Auth, ClientConfig};
use crate::Result;

/// [`Transport`] backed by a pooled `reqwest` blocking client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Build the HTTP client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(config.ignore_ssl_check());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config: config.clone(),
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.auth() {
            Some(Auth::Basic { user, password }) => builder.basic_auth(user, Some(password)),
            Some(Auth::Bearer(token)) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.config.endpoint_url(&request.path);
        tracing::debug!(
            method = %request.method,
            url = %url,
            query = ?request.query,
            body = ?request.body,
            "sending request"
        );

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        let mut builder = self.authorize(builder);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        tracing::debug!(status, url = %url, "received response");
        tracing::trace!(body = %text, "response body");

        read_response(status, text)
    }
}

/// Pair a status with its decoded body.
fn read_response(status: u16, text: String) -> Result<ApiResponse> {
    match decode_body(&text) {
        Ok(body) => Ok(ApiResponse::new(status, body)),
        Err(err) => {
            // Proxies answer errors with HTML; keep the text as the message.
            let fallback = ApiResponse::new(status, json!({ "message": text }));
            if fallback.is_success() {
                return Err(err);
            }
            Ok(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_builds_with_options() {
        let config = ClientConfig::builder("https://localhost:5000")
            .bearer_token("t")
            .ignore_ssl_check(true)
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[test]
    fn test_html_error_page_becomes_message() {
        let response = read_response(502, "<html>Bad Gateway</html>".to_string()).unwrap();
        assert_eq!(response.status, 502);
        assert_eq!(response.body["message"], "<html>Bad Gateway</html>");

        let redirect = read_response(300, "<html>moved</html>".to_string()).unwrap();
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_invalid_json_on_success_is_json_error() {
        let err = read_response(299, "<html>ok</html>".to_string()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        let blank = read_response(204, String::new()).unwrap();
        assert_eq!(blank.body, json!({}));
    }

    #[test]
    fn test_unreachable_server_is_http_error() {
        let config = ClientConfig::builder("http://127.0.0.1:9")
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport.send(&ApiRequest::get("experiments/list")).unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
