//! Identifiers and per-call options for manager operations.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// Identifies one object within a manager's collection.
///
/// Composite identifiers address nested paths such as
/// `repository/files/{path}/raw`; each part becomes its own segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// Numeric id.
    Int(u64),
    /// String id, such as a username, a full project path or a file path.
    Str(String),
    /// Several segments joined with `/`.
    Composite(Vec<ResourceId>),
}

impl ResourceId {
    /// Returns the percent-encoded path segment(s) for this id.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => urlencoding::encode(s).into_owned(),
            Self::Composite(parts) => parts
                .iter()
                .map(Self::to_path_segment)
                .collect::<Vec<_>>()
                .join("/"),
        }
    }

    /// Returns the id as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::String(s.clone()),
            Self::Composite(parts) => Value::Array(parts.iter().map(Self::to_value).collect()),
        }
    }

    /// Converts an attribute value into an id.
    ///
    /// Arrays become composite ids; every element must itself convert.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Str(s.clone())),
            Value::Array(parts) if !parts.is_empty() => parts
                .iter()
                .map(Self::from_value)
                .collect::<Option<Vec<_>>>()
                .map(Self::Composite),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Composite(parts) => {
                let joined: Vec<String> = parts.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join("/"))
            }
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self::Int(id)
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        Self::Int(u64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl From<Vec<Self>> for ResourceId {
    fn from(parts: Vec<Self>) -> Self {
        Self::Composite(parts)
    }
}

/// Options for a single-object fetch.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Build a local reference without contacting the server.
    pub lazy: bool,
    /// Extra query parameters.
    pub query: Map<String, Value>,
}

impl GetOptions {
    /// Creates default options (eager, no query).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the fetch is lazy.
    #[must_use]
    pub const fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Options for a list operation.
///
/// # Example
///
/// ```rust
/// use gitlab_api::rest::ListOptions;
///
/// let options = ListOptions::new()
///     .filter("state", "opened")
///     .filter("labels", vec!["bug", "p1"])
///     .per_page(50);
/// assert_eq!(options.per_page, Some(50));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Filters sent as query parameters.
    pub filters: Map<String, Value>,
    /// Page size for this listing; overrides the configured default.
    pub per_page: Option<u32>,
    /// Fetch exactly this page and do not follow pagination.
    pub page: Option<u32>,
}

impl ListOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Requests a single page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Serializes JSON attributes into query parameters.
///
/// Arrays become comma-separated lists, nested objects are sent as JSON and
/// nulls are skipped.
#[must_use]
pub fn to_query(params: &Map<String, Value>) -> HashMap<String, String> {
    let mut query = HashMap::new();

    for (key, value) in params {
        let rendered = match value {
            Value::Null => continue,
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Number(_) | Value::Bool(_) => value.to_string(),
        };
        query.insert(key.clone(), rendered);
    }

    query
}
