//! Retry classification and backoff.
//!
//! Each attempt ends in one of three outcomes: success, a retry after some
//! delay, or a final error. [`RetryPolicy`] decides which, from the method,
//! the attempt number and what came back.

use std::time::Duration;

use rand::Rng;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::HttpResponse;
use crate::clients::transport::TransportError;
use crate::config::{
    GitlabConfig, DEFAULT_BASE_BACKOFF, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF,
    DEFAULT_MAX_RETRY_AFTER,
};

/// Statuses treated as transient besides the Cloudflare 52x range.
pub const TRANSIENT_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

/// Returns `true` for 5xx statuses worth retrying.
#[must_use]
pub fn is_transient_status(code: u16) -> bool {
    TRANSIENT_STATUS_CODES.contains(&code) || (520..=530).contains(&code)
}

/// What the client should do after an attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Hand the response to the caller.
    Success(HttpResponse),
    /// Sleep for `delay`, then try again.
    Retry {
        /// How long to wait.
        delay: Duration,
        /// Short description for logs.
        reason: String,
    },
    /// Stop and return this error.
    Fail(HttpError),
}

/// Retry settings derived from [`GitlabConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, the first one included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_backoff: Duration,
    /// Cap on a computed delay.
    pub max_backoff: Duration,
    /// Cap on a server-requested delay.
    pub max_retry_after: Duration,
    /// Retry 429 responses.
    pub obey_rate_limit: bool,
    /// Retry transient 5xx responses and transport failures.
    pub retry_transient_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
            obey_rate_limit: true,
            retry_transient_errors: true,
        }
    }
}

impl RetryPolicy {
    /// Builds the policy from a client configuration.
    #[must_use]
    pub const fn from_config(config: &GitlabConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            base_backoff: config.base_backoff(),
            max_backoff: config.max_backoff(),
            max_retry_after: config.max_retry_after(),
            obey_rate_limit: config.obey_rate_limit(),
            retry_transient_errors: config.retry_transient_errors(),
        }
    }

    /// Returns `true` if a response with `code` may be retried for `method`.
    ///
    /// Rate limiting is retried for every method since the server did not
    /// process the request. Transient 5xx errors are retried only for
    /// idempotent methods.
    #[must_use]
    pub fn should_retry_status(&self, method: HttpMethod, code: u16) -> bool {
        match code {
            429 => self.obey_rate_limit,
            c if is_transient_status(c) => self.retry_transient_errors && method.is_idempotent(),
            _ => false,
        }
    }

    /// Returns `true` if a transport failure may be retried for `method`.
    #[must_use]
    pub const fn should_retry_transport(&self, method: HttpMethod, error: &TransportError) -> bool {
        self.retry_transient_errors
            && (method.is_idempotent() || !error.request_may_have_been_sent())
    }

    /// Exponential delay for the retry following failed attempt `attempt`
    /// (1-based), capped at `max_backoff`, plus up to 10% jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let base = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_backoff);

        let ceiling = u64::try_from(base.as_millis() / 10).unwrap_or(u64::MAX);
        let jitter = if ceiling == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=ceiling)
        };
        base.saturating_add(Duration::from_millis(jitter))
    }

    /// Delay before retrying after `response`. A 429 honours the server's
    /// requested delay when one was sent, up to `max_retry_after`.
    #[must_use]
    pub fn delay_for(&self, response: &HttpResponse, attempt: u32) -> Duration {
        if response.code == 429 {
            if let Some(requested) = response.retry_after {
                return requested.min(self.max_retry_after);
            }
        }
        self.backoff(attempt)
    }

    /// Decides the outcome of an attempt that produced a response.
    #[must_use]
    pub fn classify_response(
        &self,
        method: HttpMethod,
        attempt: u32,
        response: HttpResponse,
    ) -> AttemptOutcome {
        if response.is_ok() {
            return AttemptOutcome::Success(response);
        }

        let code = response.code;
        if self.should_retry_status(method, code) {
            if attempt < self.max_attempts {
                return AttemptOutcome::Retry {
                    delay: self.delay_for(&response, attempt),
                    reason: format!("status {code}"),
                };
            }
            if self.max_attempts > 1 {
                return AttemptOutcome::Fail(HttpError::MaxRetries(
                    MaxHttpRetriesExceededError {
                        code,
                        tries: attempt,
                        message: response.error_message(),
                        error_reference: response.request_id().map(String::from),
                    },
                ));
            }
        }

        let error = HttpResponseError {
            code,
            message: response.error_message(),
            error_reference: response.request_id().map(String::from),
            body: response.body,
        };
        if code == 401 {
            AttemptOutcome::Fail(HttpError::Authentication(error))
        } else {
            AttemptOutcome::Fail(HttpError::Response(error))
        }
    }

    /// Decides the outcome of an attempt that failed in the transport.
    #[must_use]
    pub fn classify_transport_error(
        &self,
        method: HttpMethod,
        attempt: u32,
        error: TransportError,
    ) -> AttemptOutcome {
        if attempt < self.max_attempts && self.should_retry_transport(method, &error) {
            return AttemptOutcome::Retry {
                delay: self.backoff(attempt),
                reason: error.to_string(),
            };
        }
        AttemptOutcome::Fail(HttpError::Transport(error))
    }
}
