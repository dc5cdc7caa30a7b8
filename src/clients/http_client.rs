//! HTTP client for GitLab API communication.
//!
//! [`HttpClient`] turns an [`HttpRequest`] into transport calls, applying
//! default headers and credentials and driving the retry loop described by
//! [`RetryPolicy`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::cancel::CancellationToken;
use crate::clients::errors::HttpError;
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::clients::retry::{AttemptOutcome, RetryPolicy};
use crate::clients::transport::{
    HttpTransport, ReqwestTransport, TransportRequest, TransportResponse,
};
use crate::config::GitlabConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the GitLab API.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use gitlab_api::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&config)?;
/// let request = HttpRequest::builder(HttpMethod::Get, "projects").build()?;
/// let response = client.request(request, None).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    default_headers: HashMap<String, String>,
    retry_policy: RetryPolicy,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client backed by [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] if the reqwest client cannot be built.
    pub fn new(config: &GitlabConfig) -> Result<Self, HttpError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client that sends every request through `transport`.
    #[must_use]
    pub fn with_transport(config: &GitlabConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}gitlab-api-rust v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(auth) = config.auth() {
            let (name, value) = auth.header();
            default_headers.insert(name.to_string(), value);
        }

        Self {
            transport,
            api_url: config.api_url(),
            default_headers,
            retry_policy: RetryPolicy::from_config(config),
        }
    }

    /// Returns the API root relative paths are joined to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Resolves `path` against the API root. Absolute URLs pass through.
    #[must_use]
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api_url, path.trim_start_matches('/'))
        }
    }

    /// Sends a request, retrying according to the policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - the request fails validation (`InvalidRequest`)
    /// - `cancel` fires before or between attempts (`Cancelled`)
    /// - the server answers 401 (`Authentication`)
    /// - a non-2xx status is not retryable (`Response`)
    /// - the retry budget runs out (`MaxRetries`, or `Transport` for
    ///   transport failures)
    /// - a successful response is not valid JSON (`Parse`)
    pub async fn request(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let method = request.http_method;
        let url = self.build_url(&request.path);

        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut query: Vec<(String, String)> = request
            .query
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.sort();
        let body = request.body.as_ref().map(Value::to_string);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(HttpError::Cancelled);
            }

            tracing::debug!(method = %method, url = %url, attempt, "Sending request");
            let transport_request = TransportRequest {
                method,
                url: url.clone(),
                query: query.clone(),
                headers: headers.clone(),
                body: body.clone(),
            };

            let outcome = match self.transport.execute(transport_request).await {
                Ok(raw) => {
                    let response = Self::decode(raw)?;
                    if let Some(request_id) = response.request_id() {
                        tracing::debug!(status = response.code, request_id, "Received response");
                    }
                    self.retry_policy.classify_response(method, attempt, response)
                }
                Err(error) => self
                    .retry_policy
                    .classify_transport_error(method, attempt, error),
            };

            match outcome {
                AttemptOutcome::Success(response) => return Ok(response),
                AttemptOutcome::Fail(error) => return Err(error),
                AttemptOutcome::Retry { delay, reason } => {
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        attempt,
                        max_attempts = self.retry_policy.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying request after {reason}"
                    );
                    Self::sleep(delay, cancel).await?;
                }
            }
        }
    }

    /// Decodes the body of a raw response.
    ///
    /// Empty bodies become `Null`. A body that is not JSON is an error on
    /// success and kept as a string otherwise, so error messages survive.
    fn decode(raw: TransportResponse) -> Result<HttpResponse, HttpError> {
        let body = if raw.body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&raw.body) {
                Ok(value) => value,
                Err(e) if (200..=299).contains(&raw.status) => {
                    return Err(HttpError::Parse {
                        code: raw.status,
                        message: e.to_string(),
                    });
                }
                Err(_) => Value::String(raw.body),
            }
        };
        Ok(HttpResponse::new(raw.status, raw.headers, body))
    }

    async fn sleep(
        delay: std::time::Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), HttpError> {
        match cancel {
            Some(token) => {
                tokio::select! {
                    () = tokio::time::sleep(delay) => Ok(()),
                    () = token.cancelled() => Err(HttpError::Cancelled),
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
