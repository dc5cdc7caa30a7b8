//! The runtime manager bound to one resource definition.

use serde_json::{Map, Value};

use crate::clients::{HttpError, RestClient};
use crate::rest::path::resolve_path;
use crate::rest::{Capability, ResourceDefinition, ResourceError, ResourceId, RestObject};

/// A manager for one resource kind at one resolved path.
///
/// Managers are created by [`RestClient::manager`] for top-level
/// collections, or by [`RestObject::manager`] for nested ones. The path is
/// resolved once at construction and never changes, even if the parent
/// object that scoped it is later modified.
///
/// Operations come from the mixin traits in [`crate::rest::mixins`], which
/// `RestManager` implements with a runtime capability check:
///
/// ```rust,ignore
/// use gitlab_api::rest::{CreateMixin, ListMixin};
///
/// let issues = project.manager("issues")?;
/// let issue = issues.create(attrs).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RestManager {
    client: RestClient,
    definition: &'static ResourceDefinition,
    path: String,
    parent_attrs: Map<String, Value>,
}

// Verify RestManager is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestManager>();
};

impl RestManager {
    /// Validates `definition` and resolves its path from `scope`.
    pub(crate) fn new(
        client: RestClient,
        definition: &'static ResourceDefinition,
        scope: Map<String, Value>,
    ) -> Result<Self, ResourceError> {
        definition.validate()?;
        let path = resolve_path(definition.name, definition.path, &scope)?;
        tracing::debug!(resource = definition.name, path = %path, "Created manager");
        Ok(Self {
            client,
            definition,
            path,
            parent_attrs: scope,
        })
    }

    /// Builds a nested manager, taking scope values from a parent's
    /// attributes through the definition's parent mapping.
    pub(crate) fn for_parent(
        client: RestClient,
        definition: &'static ResourceDefinition,
        parent: &Map<String, Value>,
    ) -> Result<Self, ResourceError> {
        let scope = definition
            .from_parent_attrs
            .iter()
            .filter_map(|(placeholder, attr)| {
                parent
                    .get(*attr)
                    .filter(|value| !value.is_null())
                    .map(|value| ((*placeholder).to_string(), value.clone()))
            })
            .collect();
        Self::new(client, definition, scope)
    }

    /// Returns the resource name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Returns the definition this manager serves.
    #[must_use]
    pub const fn definition(&self) -> &'static ResourceDefinition {
        self.definition
    }

    /// Returns the resolved collection path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the scope values the path was resolved from.
    #[must_use]
    pub const fn parent_attrs(&self) -> &Map<String, Value> {
        &self.parent_attrs
    }

    /// Returns the client requests are sent through.
    #[must_use]
    pub const fn client(&self) -> &RestClient {
        &self.client
    }

    /// Returns `true` if the definition declares `capability`.
    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        self.definition.supports(capability)
    }

    pub(crate) fn require(&self, capability: Capability) -> Result<(), ResourceError> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(ResourceError::UnsupportedOperation {
                resource: self.name(),
                operation: capability,
            })
        }
    }

    /// Path of one object; the collection path itself for `None`.
    pub(crate) fn object_path(&self, id: Option<&ResourceId>) -> String {
        match id {
            Some(id) => format!("{}/{}", self.path, id.to_path_segment()),
            None => self.path.clone(),
        }
    }

    pub(crate) fn map_http_error(
        &self,
        error: HttpError,
        id: Option<&ResourceId>,
    ) -> ResourceError {
        let id = id.map(ToString::to_string);
        ResourceError::from_http_error(error, self.name(), id.as_deref())
    }

    /// Wraps a server representation in an object bound to this manager.
    pub(crate) fn object_from_value(&self, value: Value) -> Result<RestObject, ResourceError> {
        match value {
            Value::Object(attrs) => Ok(RestObject::from_server(self.clone(), attrs)),
            other => Err(ResourceError::UnexpectedResponse {
                resource: self.name(),
                message: format!("expected a JSON object, got {}", json_type(&other)),
            }),
        }
    }
}

pub(crate) const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
