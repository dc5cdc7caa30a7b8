//! Capability traits for managers.
//!
//! Each trait adds one operation. A catalog type wraps a [`RestManager`],
//! implements [`ManagerBase`] and then only the traits its resource
//! supports, so calling an unsupported operation does not compile:
//!
//! ```rust,ignore
//! use gitlab_api::rest::{GetMixin, ListMixin, ManagerBase, RestManager};
//!
//! pub struct EventManager(RestManager);
//!
//! impl ManagerBase for EventManager {
//!     fn rest_manager(&self) -> &RestManager {
//!         &self.0
//!     }
//! }
//!
//! impl ListMixin for EventManager {}
//!
//! // events.create(..) is a compile error: EventManager is not CreateMixin.
//! ```
//!
//! [`RestManager`] implements every trait and checks the declared
//! [`CapabilitySet`](crate::rest::CapabilitySet) when called instead. Either
//! way an unsupported operation fails before any request is sent.

use serde_json::{Map, Value};

use crate::rest::manager::json_type;
use crate::rest::options::to_query;
use crate::rest::{
    Capability, GetOptions, ListOptions, ObjectList, ResourceError, ResourceId, RestManager,
    RestObject,
};

/// Access to the manager an implementation is bound to.
pub trait ManagerBase {
    /// Returns the underlying manager.
    fn rest_manager(&self) -> &RestManager;
}

impl ManagerBase for RestManager {
    fn rest_manager(&self) -> &RestManager {
        self
    }
}

/// Listing of a collection.
#[allow(async_fn_in_trait)]
pub trait ListMixin: ManagerBase {
    /// Returns a lazy sequence over the collection.
    ///
    /// No request is sent until the sequence is consumed. Unknown filters
    /// are passed through; declared required filters are checked here.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UnsupportedOperation`] or
    /// [`ResourceError::MissingAttributes`].
    fn list(&self, options: &ListOptions) -> Result<ObjectList, ResourceError> {
        list_at(self.rest_manager(), options)
    }

    /// Fetches every page, in server order.
    ///
    /// # Errors
    ///
    /// Any error from [`list`](Self::list) or from a page request. A
    /// cancelled listing returns the error, never a partial result.
    async fn list_all(&self, options: &ListOptions) -> Result<Vec<RestObject>, ResourceError> {
        self.list(options)?.collect_all().await
    }
}

/// Fetching one object by identifier.
#[allow(async_fn_in_trait)]
pub trait GetMixin: ManagerBase {
    /// Fetches the object identified by `id`.
    ///
    /// With `options.lazy` no request is sent and the object holds only its
    /// identifier until refreshed.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] on 404, otherwise the mapped HTTP error.
    async fn get(
        &self,
        id: impl Into<ResourceId>,
        options: GetOptions,
    ) -> Result<RestObject, ResourceError> {
        let manager = self.rest_manager();
        let id = id.into();
        if options.lazy {
            return lazy_at(manager, id);
        }
        let attrs = get_at(manager, Some(&id), Capability::Get, &options.query).await?;
        Ok(RestObject::from_server(manager.clone(), attrs))
    }

    /// Builds a lazy reference to `id` without contacting the server.
    ///
    /// # Errors
    ///
    /// [`ResourceError::UnsupportedOperation`] if `Get` is not declared.
    fn get_lazy(&self, id: impl Into<ResourceId>) -> Result<RestObject, ResourceError> {
        lazy_at(self.rest_manager(), id.into())
    }
}

/// Fetching a singleton resource addressed by its collection path.
#[allow(async_fn_in_trait)]
pub trait GetWithoutIdMixin: ManagerBase {
    /// Fetches the singleton.
    ///
    /// # Errors
    ///
    /// The mapped HTTP error, or [`ResourceError::UnsupportedOperation`].
    async fn get_singleton(&self, options: GetOptions) -> Result<RestObject, ResourceError> {
        let manager = self.rest_manager();
        let attrs = get_at(manager, None, Capability::GetWithoutId, &options.query).await?;
        Ok(RestObject::from_server(manager.clone(), attrs))
    }
}

/// Creating objects.
#[allow(async_fn_in_trait)]
pub trait CreateMixin: ManagerBase {
    /// Creates an object from `data`.
    ///
    /// Declared required attributes are checked before the request. The
    /// request is sent once unless it provably never reached the server.
    ///
    /// # Errors
    ///
    /// [`ResourceError::MissingAttributes`], [`ResourceError::ExclusiveAttributes`],
    /// [`ResourceError::ValidationFailed`] or the mapped HTTP error.
    async fn create(&self, data: Map<String, Value>) -> Result<RestObject, ResourceError> {
        let manager = self.rest_manager();
        manager.require(Capability::Create)?;
        manager
            .definition()
            .create_attrs
            .validate(manager.name(), "create", &data, &[])?;

        let response = manager
            .client()
            .post(manager.path(), Value::Object(data.clone()), None)
            .await
            .map_err(|e| manager.map_http_error(e, None))?;

        match response.body {
            Value::Null => Ok(RestObject::from_server(manager.clone(), data)),
            body => manager.object_from_value(body),
        }
    }
}

/// Updating objects by identifier.
#[allow(async_fn_in_trait)]
pub trait UpdateMixin: ManagerBase {
    /// Sends `data` to the object identified by `id`.
    ///
    /// Returns the server representation, if the server sent one.
    ///
    /// # Errors
    ///
    /// Local attribute validation errors or the mapped HTTP error.
    async fn update(
        &self,
        id: impl Into<ResourceId>,
        data: Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>, ResourceError> {
        let id = id.into();
        update_at(self.rest_manager(), Some(&id), data).await
    }

    /// Sends `data` to a singleton resource.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    async fn update_singleton(
        &self,
        data: Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>, ResourceError> {
        update_at(self.rest_manager(), None, data).await
    }
}

/// Deleting objects by identifier.
#[allow(async_fn_in_trait)]
pub trait DeleteMixin: ManagerBase {
    /// Deletes the object identified by `id`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] on 404, otherwise the mapped HTTP error.
    async fn delete(&self, id: impl Into<ResourceId>) -> Result<(), ResourceError> {
        let id = id.into();
        delete_at(self.rest_manager(), Some(&id)).await
    }
}

/// List and get.
pub trait RetrieveMixin: ListMixin + GetMixin {}

impl<T: ListMixin + GetMixin> RetrieveMixin for T {}

/// List, get, create, update and delete.
pub trait CrudMixin: RetrieveMixin + CreateMixin + UpdateMixin + DeleteMixin {}

impl<T: RetrieveMixin + CreateMixin + UpdateMixin + DeleteMixin> CrudMixin for T {}

impl ListMixin for RestManager {}
impl GetMixin for RestManager {}
impl GetWithoutIdMixin for RestManager {}
impl CreateMixin for RestManager {}
impl UpdateMixin for RestManager {}
impl DeleteMixin for RestManager {}

pub(crate) fn list_at(
    manager: &RestManager,
    options: &ListOptions,
) -> Result<ObjectList, ResourceError> {
    manager.require(Capability::List)?;
    manager
        .definition()
        .list_filters
        .validate(manager.name(), "list", &options.filters, &[])?;
    Ok(ObjectList::new(manager.clone(), options))
}

fn lazy_at(manager: &RestManager, id: ResourceId) -> Result<RestObject, ResourceError> {
    manager.require(Capability::Get)?;
    Ok(RestObject::lazy(manager.clone(), &id))
}

/// Fetches one object's attributes, requiring `capability`.
pub(crate) async fn get_at(
    manager: &RestManager,
    id: Option<&ResourceId>,
    capability: Capability,
    query: &Map<String, Value>,
) -> Result<Map<String, Value>, ResourceError> {
    manager.require(capability)?;
    let query = (!query.is_empty()).then(|| to_query(query));

    let response = manager
        .client()
        .get(&manager.object_path(id), query)
        .await
        .map_err(|e| manager.map_http_error(e, id))?;

    expect_object(manager, response.body)
}

/// Sends an update, validating `data` against the declared update rules.
pub(crate) async fn update_at(
    manager: &RestManager,
    id: Option<&ResourceId>,
    data: Map<String, Value>,
) -> Result<Option<Map<String, Value>>, ResourceError> {
    manager.require(Capability::Update)?;
    let definition = manager.definition();
    let excludes: Vec<&str> = definition.id_attr.into_iter().collect();
    definition
        .update_attrs
        .validate(manager.name(), "update", &data, &excludes)?;

    let response = manager
        .client()
        .request(
            definition.update_method,
            &manager.object_path(id),
            Some(Value::Object(data)),
            None,
        )
        .await
        .map_err(|e| manager.map_http_error(e, id))?;

    match response.body {
        Value::Null => Ok(None),
        body => expect_object(manager, body).map(Some),
    }
}

pub(crate) async fn delete_at(
    manager: &RestManager,
    id: Option<&ResourceId>,
) -> Result<(), ResourceError> {
    manager.require(Capability::Delete)?;
    manager
        .client()
        .delete(&manager.object_path(id), None)
        .await
        .map_err(|e| manager.map_http_error(e, id))?;
    Ok(())
}

fn expect_object(
    manager: &RestManager,
    body: Value,
) -> Result<Map<String, Value>, ResourceError> {
    match body {
        Value::Object(attrs) => Ok(attrs),
        other => Err(ResourceError::UnexpectedResponse {
            resource: manager.name(),
            message: format!("expected a JSON object, got {}", json_type(&other)),
        }),
    }
}
