//! Resource managers, objects and pagination.
//!
//! This module maps GitLab REST collections onto local objects:
//!
//! - **[`ResourceDefinition`]**: static declaration of a resource kind (path
//!   template, [`CapabilitySet`], attribute rules, nested managers)
//! - **[`RestManager`]**: a definition bound to a client and a resolved path
//! - **Mixin traits** ([`ListMixin`], [`GetMixin`], [`CreateMixin`], ...):
//!   one operation each, implemented by managers
//! - **[`RestObject`]**: server attributes plus tracked local edits
//! - **[`ObjectList`]**: lazy, single-pass paginated sequence
//! - **[`ResourceError`]**: semantic errors for all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_api::rest::{
//!     CapabilitySet, ChildManager, CreateMixin, GetMixin, GetOptions, ListMixin,
//!     ListOptions, RequiredOptional, ResourceDefinition,
//! };
//! use serde_json::json;
//!
//! static ISSUES: ResourceDefinition =
//!     ResourceDefinition::new("issue", "projects/{project_id}/issues")
//!         .capabilities(CapabilitySet::CRUD)
//!         .id_attr("iid")
//!         .from_parent_attrs(&[("project_id", "id")])
//!         .create_attrs(RequiredOptional::new(&["title"], &["description"]));
//!
//! static PROJECT_CHILDREN: [ChildManager; 1] = [ChildManager::new("issues", &ISSUES)];
//!
//! static PROJECTS: ResourceDefinition = ResourceDefinition::new("project", "projects")
//!     .capabilities(CapabilitySet::CRUD)
//!     .children(&PROJECT_CHILDREN);
//!
//! let projects = client.manager(&PROJECTS)?;
//! let mut project = projects.get("my-group/my-project", GetOptions::new()).await?;
//!
//! let issues = project.manager("issues")?;
//! let data = json!({"title": "Crash on start"}).as_object().cloned().unwrap_or_default();
//! let issue = issues.create(data).await?;
//!
//! let opened = issues
//!     .list_all(&ListOptions::new().filter("state", "opened"))
//!     .await?;
//! ```

mod capability;
mod definition;
mod errors;
mod manager;
pub mod mixins;
mod object;
mod options;
mod pagination;
mod path;

pub use capability::{Capability, CapabilitySet};
pub use definition::{ChildManager, RequiredOptional, ResourceDefinition, UpdatePolicy};
pub use errors::ResourceError;
pub use manager::RestManager;
pub use mixins::{
    CreateMixin, CrudMixin, DeleteMixin, GetMixin, GetWithoutIdMixin, ListMixin, ManagerBase,
    RetrieveMixin, UpdateMixin,
};
pub use object::RestObject;
pub use options::{to_query, GetOptions, ListOptions, ResourceId};
pub use pagination::{Cursor, ObjectList};
pub use path::{encode_segment, placeholders, resolve_path};
