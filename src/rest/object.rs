//! Stateful local representation of one server object.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::rest::mixins::{delete_at, get_at, update_at};
use crate::rest::{Capability, ResourceError, ResourceId, RestManager, UpdatePolicy};

/// One object returned by (or addressed through) a manager.
///
/// Attributes are read with [`get`](Self::get) and friends, which look in
/// local edits first, then the last-known server state, then the manager's
/// parent scope. [`set`](Self::set) records an edit; [`save`](Self::save)
/// sends edits according to the definition's [`UpdatePolicy`].
///
/// A lazy object built from an identifier alone fails on attribute reads it
/// cannot answer, rather than pretending the attribute is absent, until
/// [`refresh`](Self::refresh) fetches it.
///
/// # Example
///
/// ```rust,ignore
/// use gitlab_api::rest::{GetMixin, GetOptions};
///
/// let mut project = projects.get(42u64, GetOptions::new()).await?;
/// project.set("description", "Updated")?;
/// project.save().await?;
///
/// let issues = project.manager("issues")?;
/// ```
#[derive(Debug, Clone)]
pub struct RestObject {
    manager: RestManager,
    attrs: Map<String, Value>,
    updated: Map<String, Value>,
    lazy: bool,
    deleted: bool,
    managers: HashMap<&'static str, RestManager>,
}

// Verify RestObject is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestObject>();
};

impl RestObject {
    pub(crate) fn from_server(manager: RestManager, attrs: Map<String, Value>) -> Self {
        Self {
            manager,
            attrs,
            updated: Map::new(),
            lazy: false,
            deleted: false,
            managers: HashMap::new(),
        }
    }

    pub(crate) fn lazy(manager: RestManager, id: &ResourceId) -> Self {
        let mut attrs = Map::new();
        if let Some(id_attr) = manager.definition().id_attr {
            attrs.insert(id_attr.to_string(), id.to_value());
        }
        Self {
            lazy: true,
            ..Self::from_server(manager, attrs)
        }
    }

    /// Returns the manager this object belongs to.
    #[must_use]
    pub const fn owning_manager(&self) -> &RestManager {
        &self.manager
    }

    fn resource(&self) -> &'static str {
        self.manager.name()
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.updated
            .get(name)
            .or_else(|| self.attrs.get(name))
            .or_else(|| self.manager.parent_attrs().get(name))
    }

    /// Reads an attribute.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UndefinedAttribute`] if the object has no such
    /// attribute. For lazy objects the error says so.
    pub fn get(&self, name: &str) -> Result<&Value, ResourceError> {
        self.lookup(name)
            .ok_or_else(|| ResourceError::UndefinedAttribute {
                resource: self.resource(),
                name: name.to_string(),
                lazy: self.lazy,
            })
    }

    /// Reads an attribute that may legitimately be absent.
    ///
    /// # Errors
    ///
    /// On a lazy object an absent attribute is unknown rather than absent,
    /// so this fails with [`ResourceError::UndefinedAttribute`].
    pub fn try_get(&self, name: &str) -> Result<Option<&Value>, ResourceError> {
        match self.lookup(name) {
            Some(value) => Ok(Some(value)),
            None if self.lazy => Err(ResourceError::UndefinedAttribute {
                resource: self.resource(),
                name: name.to_string(),
                lazy: true,
            }),
            None => Ok(None),
        }
    }

    /// Reads a string attribute.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UndefinedAttribute`] or [`ResourceError::AttributeType`].
    pub fn get_str(&self, name: &str) -> Result<&str, ResourceError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.type_error(name, "string"))
    }

    /// Reads an integer attribute.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UndefinedAttribute`] or [`ResourceError::AttributeType`].
    pub fn get_i64(&self, name: &str) -> Result<i64, ResourceError> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| self.type_error(name, "integer"))
    }

    /// Reads a boolean attribute.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UndefinedAttribute`] or [`ResourceError::AttributeType`].
    pub fn get_bool(&self, name: &str) -> Result<bool, ResourceError> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.type_error(name, "boolean"))
    }

    fn type_error(&self, name: &str, expected: &'static str) -> ResourceError {
        ResourceError::AttributeType {
            resource: self.resource(),
            name: name.to_string(),
            expected,
        }
    }

    /// Records a local edit, sent by the next [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// [`ResourceError::ObjectDeleted`] after [`delete`](Self::delete).
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ResourceError> {
        self.ensure_live()?;
        self.updated.insert(name.into(), value.into());
        Ok(())
    }

    /// Returns the identifier, preferring the server-known value over a
    /// local edit.
    #[must_use]
    pub fn id(&self) -> Option<ResourceId> {
        let id_attr = self.manager.definition().id_attr?;
        self.attrs
            .get(id_attr)
            .or_else(|| self.updated.get(id_attr))
            .and_then(ResourceId::from_value)
    }

    /// Returns the merged view of parent scope, server state and local edits.
    #[must_use]
    pub fn attributes(&self) -> Map<String, Value> {
        let mut merged = self.manager.parent_attrs().clone();
        for (key, value) in self.attrs.iter().chain(&self.updated) {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Returns the names of attributes edited since the last save.
    #[must_use]
    pub fn updated_keys(&self) -> Vec<&str> {
        self.updated.keys().map(String::as_str).collect()
    }

    /// Returns `true` if there are unsaved edits.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.updated.is_empty()
    }

    /// Returns `true` until the object has been fetched.
    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Returns `true` after a successful [`delete`](Self::delete).
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns [`attributes`](Self::attributes) as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes())
    }

    fn ensure_live(&self) -> Result<(), ResourceError> {
        if self.deleted {
            return Err(ResourceError::ObjectDeleted {
                resource: self.resource(),
                id: self.id().map_or_else(|| "unknown".to_string(), |id| id.to_string()),
            });
        }
        Ok(())
    }

    /// Identifier used to address this object; `None` for singletons.
    fn address(&self, operation: Capability) -> Result<Option<ResourceId>, ResourceError> {
        if self.manager.definition().id_attr.is_none() {
            return Ok(None);
        }
        self.id().map(Some).ok_or(ResourceError::MissingId {
            resource: self.resource(),
            operation,
        })
    }

    fn save_payload(&self) -> Option<Map<String, Value>> {
        let definition = self.manager.definition();
        let mut payload = self.updated.clone();

        match definition.update_policy {
            UpdatePolicy::ChangedOnly => {}
            UpdatePolicy::ChangedWithRequired => {
                for name in definition.update_attrs.required {
                    if let (false, Some(value)) = (payload.contains_key(*name), self.lookup(name)) {
                        payload.insert((*name).to_string(), value.clone());
                    }
                }
            }
            UpdatePolicy::Full => {
                for name in definition.update_attrs.all() {
                    if let (false, Some(value)) = (payload.contains_key(name), self.lookup(name)) {
                        payload.insert(name.to_string(), value.clone());
                    }
                }
                return Some(payload);
            }
        }

        self.is_dirty().then_some(payload)
    }

    /// Sends local edits to the server.
    ///
    /// Under [`UpdatePolicy::ChangedOnly`] and
    /// [`UpdatePolicy::ChangedWithRequired`] an object without edits is left
    /// alone and no request is sent. Under [`UpdatePolicy::Full`] a request
    /// is always sent.
    ///
    /// On success the server representation replaces the local state, or
    /// the edits are folded into it when the server returns nothing.
    ///
    /// # Errors
    ///
    /// [`ResourceError::ObjectDeleted`], [`ResourceError::UnsupportedOperation`],
    /// [`ResourceError::MissingId`], local validation errors, or the mapped
    /// HTTP error. Edits are kept on failure.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        self.ensure_live()?;
        self.manager.require(Capability::Update)?;

        let Some(payload) = self.save_payload() else {
            tracing::debug!(resource = self.resource(), "Nothing to save");
            return Ok(());
        };
        let id = self.address(Capability::Update)?;

        let server = update_at(&self.manager, id.as_ref(), payload).await?;
        match server {
            Some(attrs) if !attrs.is_empty() => {
                self.attrs = attrs;
                self.updated.clear();
                self.lazy = false;
            }
            _ => {
                let edits = std::mem::take(&mut self.updated);
                self.attrs.extend(edits);
            }
        }
        Ok(())
    }

    /// Re-fetches the object, discarding local edits.
    ///
    /// # Errors
    ///
    /// [`ResourceError::ObjectDeleted`], [`ResourceError::UnsupportedOperation`],
    /// [`ResourceError::MissingId`], or the mapped HTTP error.
    pub async fn refresh(&mut self) -> Result<(), ResourceError> {
        self.ensure_live()?;
        let id = self.address(Capability::Refresh)?;
        let attrs = get_at(&self.manager, id.as_ref(), Capability::Refresh, &Map::new()).await?;
        self.attrs = attrs;
        self.updated.clear();
        self.lazy = false;
        Ok(())
    }

    /// Deletes the object on the server.
    ///
    /// The local value stays readable but every later `set`, `save`,
    /// `refresh` or `delete` fails with [`ResourceError::ObjectDeleted`].
    ///
    /// # Errors
    ///
    /// [`ResourceError::UnsupportedOperation`], [`ResourceError::MissingId`],
    /// or the mapped HTTP error.
    pub async fn delete(&mut self) -> Result<(), ResourceError> {
        self.ensure_live()?;
        let id = self.address(Capability::Delete)?;
        delete_at(&self.manager, id.as_ref()).await?;
        self.deleted = true;
        Ok(())
    }

    /// Returns the nested manager named `relation`, creating it on first use.
    ///
    /// The manager's path is resolved from this object's server-known
    /// attributes at that moment; later edits to the object do not move it.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UnknownRelation`] if the definition declares no such
    /// child, or the errors of manager construction.
    pub fn manager(&mut self, relation: &str) -> Result<&RestManager, ResourceError> {
        let child = self
            .manager
            .definition()
            .child(relation)
            .ok_or_else(|| ResourceError::UnknownRelation {
                resource: self.manager.name(),
                relation: relation.to_string(),
            })?;

        match self.managers.entry(child.relation) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mut source = self.manager.parent_attrs().clone();
                source.extend(self.attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
                let nested = RestManager::for_parent(
                    self.manager.client().clone(),
                    child.definition,
                    &source,
                )?;
                Ok(entry.insert(nested))
            }
        }
    }
}

impl PartialEq for RestObject {
    fn eq(&self, other: &Self) -> bool {
        self.resource() == other.resource() && self.attributes() == other.attributes()
    }
}
