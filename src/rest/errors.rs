//! Errors returned by managers and objects.
//!
//! Local checks (capabilities, definitions, required attributes, path
//! placeholders) fail before any request is sent. Server failures arrive as
//! [`HttpError`] and are mapped onto semantic variants:
//!
//! - **404**: [`ResourceError::NotFound`]
//! - **400 / 422** with a structured body: [`ResourceError::ValidationFailed`]
//! - **Anything else**: [`ResourceError::Http`]
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_api::rest::{GetMixin, GetOptions, ResourceError};
//!
//! match projects.get(123, GetOptions::default()).await {
//!     Ok(project) => println!("Found: {}", project.get_str("name")?),
//!     Err(ResourceError::NotFound { resource, id, message, .. }) => {
//!         println!("{resource} with id {id} not found: {message}");
//!     }
//!     Err(ResourceError::ValidationFailed { errors, .. }) => {
//!         for (field, messages) in errors {
//!             println!("{field}: {messages:?}");
//!         }
//!     }
//!     Err(e) => println!("Other error ({}): {e}", e.kind()),
//! }
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::clients::{HttpError, HttpResponseError};
use crate::error::ErrorKind;
use crate::rest::Capability;

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The manager does not declare the requested operation.
    #[error("{resource} does not support the {operation} operation")]
    UnsupportedOperation {
        /// Resource name.
        resource: &'static str,
        /// The refused operation.
        operation: Capability,
    },

    /// A path placeholder had no value in the manager scope.
    #[error("Cannot resolve path for {resource}: no value for placeholder '{placeholder}'")]
    UnresolvedPlaceholder {
        /// Resource name.
        resource: &'static str,
        /// The placeholder left unfilled.
        placeholder: String,
    },

    /// A resource definition is inconsistent.
    #[error("Invalid definition for {resource}: {reason}")]
    InvalidDefinition {
        /// Resource name.
        resource: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An object was asked for a nested manager its kind does not declare.
    #[error("{resource} has no nested manager named '{relation}'")]
    UnknownRelation {
        /// Resource name.
        resource: &'static str,
        /// The requested relation.
        relation: String,
    },

    /// Required attributes are absent.
    #[error("Missing attributes for {resource} {operation}: {}", .missing.join(", "))]
    MissingAttributes {
        /// Resource name.
        resource: &'static str,
        /// `create`, `update` or `list`.
        operation: &'static str,
        /// The absent attribute names, in declaration order.
        missing: Vec<String>,
    },

    /// Not exactly one of a mutually exclusive group was supplied.
    #[error("{resource} {operation} requires exactly one of: {}", .attributes.join(", "))]
    ExclusiveAttributes {
        /// Resource name.
        resource: &'static str,
        /// `create`, `update` or `list`.
        operation: &'static str,
        /// The exclusive group.
        attributes: Vec<String>,
    },

    /// The server rejected the submitted attributes.
    #[error("Validation failed ({status}): {errors:?}")]
    ValidationFailed {
        /// HTTP status code, 400 or 422.
        status: u16,
        /// Server message as returned.
        message: String,
        /// Messages keyed by attribute; general messages use `base`.
        errors: HashMap<String, Vec<String>>,
        /// Request identifier of the failing response.
        request_id: Option<String>,
    },

    /// The server answered 404.
    #[error("{resource} with id {id} not found: {message}")]
    NotFound {
        /// Resource name.
        resource: &'static str,
        /// The identifier that was requested, or `unknown`.
        id: String,
        /// HTTP status code.
        status: u16,
        /// Server message, e.g. `404 Project Not Found`.
        message: String,
        /// Request identifier of the failing response.
        request_id: Option<String>,
    },

    /// An attribute was read that the object does not have.
    #[error("Attribute '{name}' of {resource} is undefined{}", lazy_suffix(.lazy))]
    UndefinedAttribute {
        /// Resource name.
        resource: &'static str,
        /// The attribute name.
        name: String,
        /// Whether the object is a lazy reference.
        lazy: bool,
    },

    /// An attribute exists but holds a different JSON type.
    #[error("Attribute '{name}' of {resource} is not a {expected}")]
    AttributeType {
        /// Resource name.
        resource: &'static str,
        /// The attribute name.
        name: String,
        /// The requested type.
        expected: &'static str,
    },

    /// The object was deleted and can no longer be used.
    #[error("{resource} with id {id} has been deleted")]
    ObjectDeleted {
        /// Resource name.
        resource: &'static str,
        /// Identifier of the deleted object.
        id: String,
    },

    /// The object lacks the identifier needed to address it.
    #[error("{resource} object has no identifier for {operation}")]
    MissingId {
        /// Resource name.
        resource: &'static str,
        /// The attempted operation.
        operation: Capability,
    },

    /// A successful response had an unexpected shape.
    #[error("Unexpected response for {resource}: {message}")]
    UnexpectedResponse {
        /// Resource name.
        resource: &'static str,
        /// What was expected.
        message: String,
    },

    /// Any other HTTP failure.
    #[error(transparent)]
    Http(#[from] HttpError),
}

const fn lazy_suffix(lazy: &bool) -> &'static str {
    if *lazy {
        " until the object is refreshed"
    } else {
        ""
    }
}

impl ResourceError {
    /// Maps an HTTP failure onto the semantic variants for `resource`.
    #[must_use]
    pub fn from_http_error(error: HttpError, resource: &'static str, id: Option<&str>) -> Self {
        match error {
            HttpError::Response(HttpResponseError {
                code: code @ 404,
                message,
                error_reference,
                ..
            }) => Self::NotFound {
                resource,
                id: id.unwrap_or("unknown").to_string(),
                status: code,
                message,
                request_id: error_reference,
            },
            HttpError::Response(response @ HttpResponseError { code: 400 | 422, .. }) => {
                let errors = parse_validation_errors(&response.body);
                if errors.is_empty() {
                    Self::Http(HttpError::Response(response))
                } else {
                    Self::ValidationFailed {
                        status: response.code,
                        message: response.message,
                        errors,
                        request_id: response.error_reference,
                    }
                }
            }
            other => Self::Http(other),
        }
    }

    /// Returns the HTTP status of the failing response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ValidationFailed { status, .. } | Self::NotFound { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the request identifier reported by the server, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { request_id, .. } | Self::NotFound { request_id, .. } => {
                request_id.as_deref()
            }
            Self::Http(e) => e.request_id(),
            _ => None,
        }
    }

    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedOperation { .. }
            | Self::UnresolvedPlaceholder { .. }
            | Self::InvalidDefinition { .. }
            | Self::UnknownRelation { .. } => ErrorKind::Configuration,
            Self::MissingAttributes { .. }
            | Self::ExclusiveAttributes { .. }
            | Self::ValidationFailed { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UndefinedAttribute { .. }
            | Self::AttributeType { .. }
            | Self::ObjectDeleted { .. }
            | Self::MissingId { .. } => ErrorKind::Attribute,
            Self::UnexpectedResponse { .. } => ErrorKind::Parsing,
            Self::Http(e) => e.kind(),
        }
    }
}

/// Extracts per-field messages from an error body.
///
/// GitLab reports them under `message` (or `errors`) as an object of
/// arrays, an array of strings, or a single string.
fn parse_validation_errors(body: &Value) -> HashMap<String, Vec<String>> {
    let mut result = HashMap::new();

    let Some(errors) = body.get("message").or_else(|| body.get("errors")) else {
        return result;
    };

    match errors {
        Value::Object(map) => {
            for (field, messages) in map {
                let msgs: Vec<String> = match messages {
                    Value::Array(arr) => arr
                        .iter()
                        .map(|v| v.as_str().map_or_else(|| v.to_string(), ToString::to_string))
                        .collect(),
                    Value::String(s) => vec![s.clone()],
                    _ => vec![messages.to_string()],
                };
                result.insert(field.clone(), msgs);
            }
        }
        Value::Array(arr) => {
            let msgs: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect();
            if !msgs.is_empty() {
                result.insert("base".to_string(), msgs);
            }
        }
        Value::String(s) => {
            result.insert("base".to_string(), vec![s.clone()]);
        }
        _ => {}
    }

    result
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
