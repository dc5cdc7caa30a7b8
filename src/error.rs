//! Configuration errors and the cross-layer error classification.
//!
//! Configuration constructors return `Result<T, ConfigError>` so invalid
//! settings are rejected before any client is built. Errors raised later by
//! the HTTP and resource layers expose an [`ErrorKind`] through their
//! `kind()` methods, which lets callers branch on the failure category
//! without matching every variant.
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::{ConfigError, PerPage};
//!
//! let result = PerPage::new(0);
//! assert!(matches!(result, Err(ConfigError::InvalidPerPage { value: 0 })));
//! ```

use std::fmt;
use thiserror::Error;

/// Errors that can occur while building a client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The server URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid server URL '{url}'. Expected an absolute http(s) URL such as 'https://gitlab.example.com'.")]
    InvalidServerUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// API version is not supported.
    #[error("Invalid API version '{version}'. Only 'v4' is supported.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Page size is outside the range the server accepts.
    #[error("Invalid page size {value}. Expected a value between 1 and 100.")]
    InvalidPerPage {
        /// The rejected page size.
        value: u32,
    },

    /// An authentication token was empty.
    #[error("Authentication token cannot be empty.")]
    EmptyToken,

    /// The retry budget must allow at least one attempt.
    #[error("Invalid retry budget {value}. At least one attempt is required.")]
    InvalidRetryBudget {
        /// The rejected attempt count.
        value: u32,
    },

    /// Backoff bounds are inconsistent.
    #[error("Invalid backoff: {reason}")]
    InvalidBackoff {
        /// Why the backoff settings were rejected.
        reason: String,
    },
}

/// Coarse classification of every error the crate can return.
///
/// Both [`HttpError`](crate::clients::HttpError) and
/// [`ResourceError`](crate::rest::ResourceError) map onto this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration, resource definition or request construction.
    Configuration,
    /// The server answered 404.
    NotFound,
    /// Local attribute validation or a server-side 400/422 rejection.
    Validation,
    /// The server answered 401.
    Authentication,
    /// The rate-limit retry budget was exhausted.
    RateLimited,
    /// A 5xx response that was not (or could no longer be) retried.
    Server,
    /// The request failed below HTTP (connect, timeout, I/O).
    Transport,
    /// The operation was cancelled or its deadline passed.
    Cancelled,
    /// The response body could not be interpreted.
    Parsing,
    /// Attribute access on an object failed.
    Attribute,
    /// Any other non-success HTTP status.
    Http,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Transport => "transport",
            Self::Cancelled => "cancelled",
            Self::Parsing => "parsing",
            Self::Attribute => "attribute",
            Self::Http => "http",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_field() {
        let error = ConfigError::MissingRequiredField { field: "url" };
        assert!(error.to_string().contains("'url'"));
    }

    #[test]
    fn test_invalid_per_page_message_includes_value() {
        let error = ConfigError::InvalidPerPage { value: 250 };
        let message = error.to_string();
        assert!(message.contains("250"));
        assert!(message.contains("between 1 and 100"));
    }

    #[test]
    fn test_config_errors_compare_by_value() {
        assert_eq!(ConfigError::EmptyToken, ConfigError::EmptyToken);
        assert_ne!(
            ConfigError::InvalidRetryBudget { value: 0 },
            ConfigError::InvalidPerPage { value: 0 }
        );
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
