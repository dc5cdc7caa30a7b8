//! GitLab REST API version selection.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// GitLab REST API version.
///
/// GitLab serves its REST API under `/api/v<N>`. Only v4 is current; the
/// enum exists so the prefix is never spelled as a free-form string.
///
/// # Example
///
/// ```rust
/// use gitlab_api::ApiVersion;
///
/// let version: ApiVersion = "v4".parse().unwrap();
/// assert_eq!(version, ApiVersion::V4);
/// assert_eq!(version.to_string(), "4");
/// assert_eq!(version.path_prefix(), "api/v4");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// REST API v4.
    #[default]
    V4,
}

impl ApiVersion {
    /// Returns the path prefix appended to the server URL.
    #[must_use]
    pub const fn path_prefix(self) -> &'static str {
        match self {
            Self::V4 => "api/v4",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("4"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.trim_start_matches('v') {
            "4" => Ok(Self::V4),
            _ => Err(ConfigError::InvalidApiVersion {
                version: s.to_string(),
            }),
        }
    }
}
