//! Pluggable HTTP transport.
//!
//! [`HttpClient`](crate::clients::HttpClient) talks to the network only
//! through [`HttpTransport`]. The default [`ReqwestTransport`] wraps a
//! `reqwest::Client`; tests and embedders can supply their own.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::clients::http_request::HttpMethod;

/// A fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Serialized JSON body.
    pub body: Option<String>,
}

/// A raw response returned by a transport.
#[derive(Clone, Debug, Default)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Headers keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
    /// Raw body text.
    pub body: String,
}

impl TransportResponse {
    /// Creates a response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header value. The name is stored lowercase.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established; nothing reached the server.
    #[error("Connection failed: {message}")]
    Connect {
        /// Underlying error text.
        message: String,
    },

    /// The attempt timed out after the request may have been sent.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Underlying error text.
        message: String,
    },

    /// Any other I/O or protocol failure.
    #[error("Transport error: {message}")]
    Io {
        /// Underlying error text.
        message: String,
    },
}

impl TransportError {
    /// Returns `false` only when the request provably never left the client.
    #[must_use]
    pub const fn request_may_have_been_sent(&self) -> bool {
        !matches!(self, Self::Connect { .. })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_connect() {
            Self::Connect { message }
        } else if error.is_timeout() {
            Self::Timeout { message }
        } else {
            Self::Io { message }
        }
    }
}

/// Executes a single HTTP exchange. Retries happen above this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Sends `request` and returns the raw response.
    ///
    /// Non-2xx statuses are responses, not errors.
    async fn execute(&self, request: TransportRequest)
        -> Result<TransportResponse, TransportError>;
}

/// [`HttpTransport`] backed by `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Io {
            message: format!("failed to create HTTP client: {e}"),
        })?;
        Ok(Self { client })
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        };

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = Self::parse_response_headers(response.headers());
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
