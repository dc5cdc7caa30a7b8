//! HTTP-layer error types.
//!
//! - [`HttpResponseError`]: a non-2xx response that was not retried
//! - [`MaxHttpRetriesExceededError`]: the retry budget ran out
//! - [`InvalidHttpRequestError`]: the request failed validation before sending
//! - [`HttpError`]: everything [`HttpClient`](crate::clients::HttpClient) can return
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_api::clients::HttpError;
//! use gitlab_api::ErrorKind;
//!
//! match client.get("projects", None).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(error) if error.kind() == ErrorKind::RateLimited => back_off(),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(other) => return Err(other.into()),
//! }
//! ```

use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::transport::TransportError;
use crate::error::ErrorKind;

/// A non-successful response that was returned without (further) retries.
///
/// `message` is taken from the JSON `message` or `error` field when the body
/// has one, otherwise it is the raw body text.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Human readable error message extracted from the body.
    pub message: String,
    /// The decoded response body.
    pub body: serde_json::Value,
    /// Request identifier for error reports (from `X-Request-Id`).
    pub error_reference: Option<String>,
}

/// The retry budget was spent and the last response was still retryable.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last response {code}: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of attempts made.
    pub tries: u32,
    /// Error message from the last response.
    pub message: String,
    /// Request identifier of the last response.
    pub error_reference: Option<String>,
}

/// A request rejected before it was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: HttpMethod,
    },

    /// The request path was empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,
}

/// Unified error type for HTTP operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response that was not retried.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The server rejected the credentials (401).
    #[error("Authentication failed: {0}")]
    Authentication(HttpResponseError),

    /// Retry attempts exhausted on a retryable status.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A successful response carried a body that is not valid JSON.
    #[error("Failed to parse response body (status {code}): {message}")]
    Parse {
        /// Status code of the response.
        code: u16,
        /// Parser error message.
        message: String,
    },

    /// The request was cancelled or its deadline passed.
    #[error("Request cancelled before completion")]
    Cancelled,
}

impl HttpError {
    /// Returns the status code of the response behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) | Self::Authentication(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::Parse { code, .. } => Some(*code),
            Self::InvalidRequest(_) | Self::Transport(_) | Self::Cancelled => None,
        }
    }

    /// Returns the request identifier reported by the server, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Response(e) | Self::Authentication(e) => e.error_reference.as_deref(),
            Self::MaxRetries(e) => e.error_reference.as_deref(),
            _ => None,
        }
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Response(e) => kind_for_status(e.code),
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::MaxRetries(e) if e.code == 429 => ErrorKind::RateLimited,
            Self::MaxRetries(e) => kind_for_status(e.code),
            Self::InvalidRequest(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Parse { .. } => ErrorKind::Parsing,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

const fn kind_for_status(code: u16) -> ErrorKind {
    match code {
        401 => ErrorKind::Authentication,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::Validation,
        429 => ErrorKind::RateLimited,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Http,
    }
}
