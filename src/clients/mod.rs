//! HTTP client types for GitLab API communication.
//!
//! # Overview
//!
//! - [`HttpClient`]: sends requests through a transport with retries
//! - [`HttpRequest`] / [`HttpResponse`]: transport-neutral request and response
//! - [`HttpTransport`]: the network seam, with [`ReqwestTransport`] as default
//! - [`RetryPolicy`]: which failures are retried and for how long
//! - [`CancellationToken`]: aborts in-flight work between attempts
//! - [`rest::RestClient`]: the handle resource managers are created from
//!
//! # Retry Behavior
//!
//! - **429**: retried for every method, waiting for `Retry-After` (or
//!   `RateLimit-Reset`) when sent, exponential backoff otherwise
//! - **500, 502, 503, 504, 520-530**: retried for idempotent methods only
//! - **Connection failures**: retried for every method, since nothing
//!   reached the server
//! - **Timeouts and other I/O errors**: retried for idempotent methods only
//! - **Everything else**: returned immediately; 401 as `Authentication`
//!
//! Attempts are bounded by `max_attempts` from the configuration.

mod cancel;
mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;
mod retry;
mod transport;

pub use cancel::CancellationToken;
pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{parse_rate_limit_reset, parse_retry_after, HttpResponse, PaginationInfo};
pub use retry::{is_transient_status, AttemptOutcome, RetryPolicy, TRANSIENT_STATUS_CODES};
pub use transport::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
};

pub use rest::RestClient;
