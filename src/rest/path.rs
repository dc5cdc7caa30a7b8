//! Path templates for resource managers.
//!
//! A manager path is a template such as `projects/{project_id}/issues`.
//! Placeholders are filled from the manager scope once, when the manager is
//! created; a placeholder without a value is an error rather than being
//! left in the URL.
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::rest::{placeholders, resolve_path};
//! use serde_json::{json, Map, Value};
//!
//! assert_eq!(placeholders("groups/{group_id}/members").unwrap(), vec!["group_id"]);
//!
//! let scope: Map<String, Value> = json!({"project_id": "my-group/my-project"})
//!     .as_object()
//!     .unwrap()
//!     .clone();
//! let path = resolve_path("issue", "projects/{project_id}/issues", &scope).unwrap();
//! assert_eq!(path, "projects/my-group%2Fmy-project/issues");
//! ```

use serde_json::{Map, Value};

use crate::rest::ResourceError;

/// Returns the placeholder names in `template`, in order.
///
/// # Errors
///
/// Returns a description of the problem for unbalanced braces or empty
/// placeholder names.
pub fn placeholders(template: &str) -> Result<Vec<&str>, String> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(format!("unmatched '}}' in '{template}'"));
        }
        let after = &rest[open + 1..];
        let close = after
            .find(['{', '}'])
            .filter(|i| after.as_bytes()[*i] == b'}')
            .ok_or_else(|| format!("unclosed '{{' in '{template}'"))?;
        let name = &after[..close];
        if name.is_empty() {
            return Err(format!("empty placeholder in '{template}'"));
        }
        names.push(name);
        rest = &after[close + 1..];
    }

    Ok(names)
}

/// Encodes a scalar JSON value as a single path segment.
///
/// Strings are percent-encoded so `group/project` stays one segment.
/// Returns `None` for null, arrays and objects.
#[must_use]
pub fn encode_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(urlencoding::encode(s).into_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Fills every placeholder in `template` from `scope`.
///
/// # Errors
///
/// - [`ResourceError::InvalidDefinition`] if the template is malformed
/// - [`ResourceError::UnresolvedPlaceholder`] if a placeholder has no usable
///   value in `scope`
pub fn resolve_path(
    resource: &'static str,
    template: &str,
    scope: &Map<String, Value>,
) -> Result<String, ResourceError> {
    let names = placeholders(template)
        .map_err(|reason| ResourceError::InvalidDefinition { resource, reason })?;

    let mut path = template.to_string();
    for name in names {
        let value = scope
            .get(name)
            .and_then(encode_segment)
            .ok_or_else(|| ResourceError::UnresolvedPlaceholder {
                resource,
                placeholder: name.to_string(),
            })?;
        path = path.replace(&format!("{{{name}}}"), &value);
    }

    Ok(path.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            placeholders("projects/{project_id}/merge_requests/{mr_iid}/notes").unwrap(),
            vec!["project_id", "mr_iid"]
        );
        assert!(placeholders("projects").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_templates() {
        assert!(placeholders("projects/{id").is_err());
        assert!(placeholders("projects/id}").is_err());
        assert!(placeholders("projects/{}/issues").is_err());
        assert!(placeholders("projects/{a{b}}").is_err());
    }

    #[test]
    fn test_resolve_numeric_and_string_values() {
        let path = resolve_path(
            "note",
            "projects/{project_id}/issues/{issue_iid}/notes",
            &scope(json!({"project_id": 12, "issue_iid": "7"})),
        )
        .unwrap();
        assert_eq!(path, "projects/12/issues/7/notes");
    }

    #[test]
    fn test_resolve_encodes_slashes() {
        let path = resolve_path(
            "branch",
            "projects/{project_id}/repository/branches",
            &scope(json!({"project_id": "group/sub group/project"})),
        )
        .unwrap();
        assert_eq!(path, "projects/group%2Fsub%20group%2Fproject/repository/branches");
    }

    #[test]
    fn test_resolve_fails_fast_on_missing_value() {
        let result = resolve_path("issue", "projects/{project_id}/issues", &Map::new());
        assert!(matches!(
            result,
            Err(ResourceError::UnresolvedPlaceholder { resource: "issue", placeholder })
                if placeholder == "project_id"
        ));

        let null = resolve_path(
            "issue",
            "projects/{project_id}/issues",
            &scope(json!({"project_id": null})),
        );
        assert!(null.is_err());
    }

    #[test]
    fn test_encode_segment_rejects_structures() {
        assert_eq!(encode_segment(&json!(5)), Some("5".to_string()));
        assert_eq!(encode_segment(&json!([1])), None);
        assert_eq!(encode_segment(&json!({})), None);
        assert_eq!(encode_segment(&json!("")), None);
    }
}
