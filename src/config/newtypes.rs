//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper checks its contents on construction, so a built
//! [`GitlabConfig`](super::GitlabConfig) never carries an unusable value.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// The base URL of a GitLab server.
///
/// Only absolute `http` and `https` URLs with a host are accepted. A trailing
/// slash is stripped so paths can be appended with a single separator.
///
/// # Serialization
///
/// `ServerUrl` serializes to and deserializes from its normalized string:
///
/// ```rust
/// use gitlab_api::ServerUrl;
///
/// let url = ServerUrl::new("https://gitlab.example.com/").unwrap();
/// let json = serde_json::to_string(&url).unwrap();
/// assert_eq!(json, r#""https://gitlab.example.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerUrl {
    url: String,
}

impl ServerUrl {
    /// Creates a new validated server URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServerUrl`] if the URL cannot be parsed,
    /// is not http(s), or has no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim().trim_end_matches('/');
        let invalid = || ConfigError::InvalidServerUrl { url: raw.clone() };

        let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            url: trimmed.to_string(),
        })
    }
}

impl AsRef<str> for ServerUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for ServerUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for ServerUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// Credentials attached to every request.
///
/// GitLab accepts three token flavours, each sent in its own header.
///
/// # Security
///
/// The `Debug` implementation masks the token, so configurations can be
/// logged safely.
///
/// ```rust
/// use gitlab_api::AuthToken;
///
/// let token = AuthToken::private("glpat-secret").unwrap();
/// assert_eq!(format!("{:?}", token), "AuthToken::Private(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum AuthToken {
    /// A personal, project or group access token (`PRIVATE-TOKEN` header).
    Private(String),
    /// An OAuth2 bearer token (`Authorization: Bearer` header).
    OAuth(String),
    /// A CI job token (`JOB-TOKEN` header).
    Job(String),
}

impl AuthToken {
    /// Creates a private access token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn private(token: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(token.into()).map(Self::Private)
    }

    /// Creates an OAuth2 bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn oauth(token: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(token.into()).map(Self::OAuth)
    }

    /// Creates a CI job token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn job(token: impl Into<String>) -> Result<Self, ConfigError> {
        non_empty(token.into()).map(Self::Job)
    }

    /// Returns the header name and value carrying this token.
    #[must_use]
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::Private(token) => ("PRIVATE-TOKEN", token.clone()),
            Self::OAuth(token) => ("Authorization", format!("Bearer {token}")),
            Self::Job(token) => ("JOB-TOKEN", token.clone()),
        }
    }
}

fn non_empty(token: String) -> Result<String, ConfigError> {
    if token.trim().is_empty() {
        return Err(ConfigError::EmptyToken);
    }
    Ok(token)
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Private(_) => "Private",
            Self::OAuth(_) => "OAuth",
            Self::Job(_) => "Job",
        };
        write!(f, "AuthToken::{variant}(*****)")
    }
}

/// Page size used by list operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PerPage(u32);

impl PerPage {
    /// Largest page size GitLab honours.
    pub const MAX: u32 = 100;

    /// Creates a validated page size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPerPage`] unless `1 <= value <= 100`.
    pub const fn new(value: u32) -> Result<Self, ConfigError> {
        if value == 0 || value > Self::MAX {
            return Err(ConfigError::InvalidPerPage { value });
        }
        Ok(Self(value))
    }

    /// Returns the page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl<'de> Deserialize<'de> for PerPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(de::Error::custom)
    }
}
