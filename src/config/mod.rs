//! Configuration types for the GitLab client.
//!
//! # Overview
//!
//! - [`GitlabConfig`]: server location, credentials, paging and retry settings
//! - [`GitlabConfigBuilder`]: fluent construction with validation in `build()`
//! - [`ServerUrl`], [`AuthToken`], [`PerPage`]: validated newtypes
//! - [`ApiVersion`]: the REST API version prefix
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::{AuthToken, GitlabConfig, PerPage, ServerUrl};
//! use std::time::Duration;
//!
//! let config = GitlabConfig::builder()
//!     .url(ServerUrl::new("https://gitlab.example.com").unwrap())
//!     .auth(AuthToken::private("glpat-example").unwrap())
//!     .per_page(PerPage::new(50).unwrap())
//!     .max_attempts(5)
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_url(), "https://gitlab.example.com/api/v4");
//! ```

mod newtypes;
mod version;

pub use newtypes::{AuthToken, PerPage, ServerUrl};
pub use version::ApiVersion;

use crate::error::ConfigError;
use std::time::Duration;

/// Default number of attempts per request, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default delay before the first retry.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(100);

/// Default upper bound on a single computed retry delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Default upper bound on a server-requested retry delay.
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Configuration for a [`RestClient`](crate::RestClient).
///
/// # Thread Safety
///
/// `GitlabConfig` is `Clone`, `Send`, and `Sync`. Clients hold it behind an
/// `Arc` and never mutate it after construction.
#[derive(Clone, Debug)]
pub struct GitlabConfig {
    url: ServerUrl,
    api_version: ApiVersion,
    auth: Option<AuthToken>,
    per_page: Option<PerPage>,
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    max_retry_after: Duration,
    obey_rate_limit: bool,
    retry_transient_errors: bool,
    keep_base_url: bool,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl GitlabConfig {
    /// Creates a new builder for constructing a `GitlabConfig`.
    #[must_use]
    pub fn builder() -> GitlabConfigBuilder {
        GitlabConfigBuilder::new()
    }

    /// Returns the server base URL.
    #[must_use]
    pub const fn url(&self) -> &ServerUrl {
        &self.url
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the root all resource paths are joined to, e.g.
    /// `https://gitlab.example.com/api/v4`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.url, self.api_version.path_prefix())
    }

    /// Returns the credentials, if configured.
    #[must_use]
    pub const fn auth(&self) -> Option<&AuthToken> {
        self.auth.as_ref()
    }

    /// Returns the default page size for list operations.
    #[must_use]
    pub const fn per_page(&self) -> Option<PerPage> {
        self.per_page
    }

    /// Returns the maximum number of attempts per request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    #[must_use]
    pub const fn base_backoff(&self) -> Duration {
        self.base_backoff
    }

    /// Returns the cap on a computed retry delay.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Returns the cap on a delay requested through `Retry-After` or
    /// `RateLimit-Reset`.
    #[must_use]
    pub const fn max_retry_after(&self) -> Duration {
        self.max_retry_after
    }

    /// Returns whether 429 responses are retried.
    #[must_use]
    pub const fn obey_rate_limit(&self) -> bool {
        self.obey_rate_limit
    }

    /// Returns whether transient 5xx and transport failures are retried.
    #[must_use]
    pub const fn retry_transient_errors(&self) -> bool {
        self.retry_transient_errors
    }

    /// Returns whether pagination links announced under another base URL
    /// are rewritten onto [`url`](Self::url).
    #[must_use]
    pub const fn keep_base_url(&self) -> bool {
        self.keep_base_url
    }

    /// Returns the per-attempt transport timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify GitlabConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GitlabConfig>();
};

/// Builder for constructing [`GitlabConfig`] instances.
///
/// `url` is the only required field.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::V4`]
/// - `auth`: `None` (anonymous access)
/// - `per_page`: `None` (server default, 20)
/// - `max_attempts`: 10
/// - `base_backoff`: 100ms, `max_backoff`: 60s
/// - `max_retry_after`: 1h
/// - `obey_rate_limit`, `retry_transient_errors`: `true`
/// - `keep_base_url`: `false`
/// - `timeout`, `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct GitlabConfigBuilder {
    url: Option<ServerUrl>,
    api_version: Option<ApiVersion>,
    auth: Option<AuthToken>,
    per_page: Option<PerPage>,
    max_attempts: Option<u32>,
    base_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
    max_retry_after: Option<Duration>,
    obey_rate_limit: Option<bool>,
    retry_transient_errors: Option<bool>,
    keep_base_url: Option<bool>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl GitlabConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL (required).
    #[must_use]
    pub fn url(mut self, url: ServerUrl) -> Self {
        self.url = Some(url);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the credentials sent with every request.
    #[must_use]
    pub fn auth(mut self, token: AuthToken) -> Self {
        self.auth = Some(token);
        self
    }

    /// Sets the default page size for list operations.
    #[must_use]
    pub const fn per_page(mut self, per_page: PerPage) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets the total number of attempts per request.
    ///
    /// A value of 1 disables retries.
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the delay before the first retry. Later retries double it.
    #[must_use]
    pub const fn base_backoff(mut self, delay: Duration) -> Self {
        self.base_backoff = Some(delay);
        self
    }

    /// Sets the cap on a computed retry delay.
    #[must_use]
    pub const fn max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = Some(delay);
        self
    }

    /// Sets the cap on a server-requested retry delay.
    #[must_use]
    pub const fn max_retry_after(mut self, delay: Duration) -> Self {
        self.max_retry_after = Some(delay);
        self
    }

    /// Sets whether 429 responses are retried.
    #[must_use]
    pub const fn obey_rate_limit(mut self, obey: bool) -> Self {
        self.obey_rate_limit = Some(obey);
        self
    }

    /// Sets whether transient 5xx and transport failures are retried.
    #[must_use]
    pub const fn retry_transient_errors(mut self, retry: bool) -> Self {
        self.retry_transient_errors = Some(retry);
        self
    }

    /// Sets whether pagination links that point at another base URL (for
    /// example a misconfigured `external_url` behind a proxy) are rewritten
    /// onto the configured URL. When unset they are followed as announced,
    /// with a warning.
    #[must_use]
    pub const fn keep_base_url(mut self, keep: bool) -> Self {
        self.keep_base_url = Some(keep);
        self
    }

    /// Sets the per-attempt transport timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`GitlabConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `url` is not set
    /// - [`ConfigError::InvalidRetryBudget`] if `max_attempts` is 0
    /// - [`ConfigError::InvalidBackoff`] if `base_backoff` exceeds `max_backoff`
    pub fn build(self) -> Result<GitlabConfig, ConfigError> {
        let url = self
            .url
            .ok_or(ConfigError::MissingRequiredField { field: "url" })?;

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetryBudget { value: 0 });
        }

        let base_backoff = self.base_backoff.unwrap_or(DEFAULT_BASE_BACKOFF);
        let max_backoff = self.max_backoff.unwrap_or(DEFAULT_MAX_BACKOFF);
        if base_backoff > max_backoff {
            return Err(ConfigError::InvalidBackoff {
                reason: format!(
                    "base backoff {base_backoff:?} exceeds max backoff {max_backoff:?}"
                ),
            });
        }

        Ok(GitlabConfig {
            url,
            api_version: self.api_version.unwrap_or_default(),
            auth: self.auth,
            per_page: self.per_page,
            max_attempts,
            base_backoff,
            max_backoff,
            max_retry_after: self.max_retry_after.unwrap_or(DEFAULT_MAX_RETRY_AFTER),
            obey_rate_limit: self.obey_rate_limit.unwrap_or(true),
            retry_transient_errors: self.retry_transient_errors.unwrap_or(true),
            keep_base_url: self.keep_base_url.unwrap_or(false),
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
