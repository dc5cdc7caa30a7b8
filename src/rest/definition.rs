//! Declarative resource kinds.
//!
//! A [`ResourceDefinition`] describes one kind of server object: where its
//! collection lives, which operations it supports, which attributes those
//! operations require, and which nested managers its objects expose.
//! Definitions are `const`-constructible so a catalog of resource kinds is
//! plain static data.
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::rest::{
//!     Capability, CapabilitySet, ChildManager, RequiredOptional, ResourceDefinition,
//! };
//!
//! static ISSUES: ResourceDefinition =
//!     ResourceDefinition::new("issue", "projects/{project_id}/issues")
//!         .capabilities(CapabilitySet::CRUD)
//!         .id_attr("iid")
//!         .from_parent_attrs(&[("project_id", "id")])
//!         .create_attrs(RequiredOptional::new(&["title"], &["description", "labels"]))
//!         .update_attrs(RequiredOptional::new(&[], &["title", "description", "state_event"]));
//!
//! static PROJECT_CHILDREN: [ChildManager; 1] = [ChildManager::new("issues", &ISSUES)];
//!
//! static PROJECTS: ResourceDefinition = ResourceDefinition::new("project", "projects")
//!     .capabilities(CapabilitySet::CRUD)
//!     .children(&PROJECT_CHILDREN);
//!
//! assert!(PROJECTS.supports(Capability::Create));
//! assert!(PROJECTS.child("issues").is_some());
//! assert!(ISSUES.validate().is_ok());
//! ```

use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::rest::path::placeholders;
use crate::rest::{Capability, CapabilitySet, ResourceError};

/// Attribute rules for one operation.
///
/// `required` must all be present. When `exclusive` is non-empty, exactly one
/// of its names must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequiredOptional {
    /// Attributes that must be supplied.
    pub required: &'static [&'static str],
    /// Attributes that may be supplied.
    pub optional: &'static [&'static str],
    /// Attributes of which exactly one must be supplied.
    pub exclusive: &'static [&'static str],
}

impl RequiredOptional {
    /// No rules.
    pub const EMPTY: Self = Self::new(&[], &[]);

    /// Creates rules with required and optional attributes.
    #[must_use]
    pub const fn new(
        required: &'static [&'static str],
        optional: &'static [&'static str],
    ) -> Self {
        Self {
            required,
            optional,
            exclusive: &[],
        }
    }

    /// Adds an exactly-one-of group.
    #[must_use]
    pub const fn with_exclusive(mut self, exclusive: &'static [&'static str]) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Returns `true` if `name` appears in any list.
    #[must_use]
    pub fn mentions(&self, name: &str) -> bool {
        self.required
            .iter()
            .chain(self.optional)
            .chain(self.exclusive)
            .any(|attr| *attr == name)
    }

    /// Iterates over every declared attribute name.
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        self.required
            .iter()
            .chain(self.optional)
            .chain(self.exclusive)
            .copied()
    }

    /// Checks `data` against the rules, ignoring names in `excludes`.
    ///
    /// A key holding `null` counts as absent.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::MissingAttributes`] naming every absent required attribute
    /// - [`ResourceError::ExclusiveAttributes`] if not exactly one exclusive
    ///   attribute is present
    pub fn validate(
        &self,
        resource: &'static str,
        operation: &'static str,
        data: &Map<String, Value>,
        excludes: &[&str],
    ) -> Result<(), ResourceError> {
        let present = |name: &str| data.get(name).is_some_and(|v| !v.is_null());

        let missing: Vec<String> = self
            .required
            .iter()
            .copied()
            .filter(|name| !excludes.contains(name) && !present(name))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ResourceError::MissingAttributes {
                resource,
                operation,
                missing,
            });
        }

        if !self.exclusive.is_empty() {
            let supplied = self.exclusive.iter().filter(|name| present(name)).count();
            if supplied != 1 {
                return Err(ResourceError::ExclusiveAttributes {
                    resource,
                    operation,
                    attributes: self.exclusive.iter().map(ToString::to_string).collect(),
                });
            }
        }

        Ok(())
    }
}

/// Which attributes an object sends when saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Only locally changed attributes. Saving an unchanged object sends
    /// nothing.
    #[default]
    ChangedOnly,
    /// Changed attributes plus the required update attributes, taken from
    /// the object when unchanged.
    ChangedWithRequired,
    /// Every declared update attribute the object has, changed or not.
    /// Always sends a request.
    Full,
}

/// A nested manager exposed by objects of a resource kind.
///
/// Child lists referencing other definitions are declared as their own
/// `static` arrays so the references live for `'static`.
#[derive(Debug, Clone, Copy)]
pub struct ChildManager {
    /// Name used to look the manager up on an object.
    pub relation: &'static str,
    /// The nested resource kind.
    pub definition: &'static ResourceDefinition,
}

impl ChildManager {
    /// Declares a nested manager.
    #[must_use]
    pub const fn new(relation: &'static str, definition: &'static ResourceDefinition) -> Self {
        Self {
            relation,
            definition,
        }
    }
}

/// Static description of one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDefinition {
    /// Human readable name used in errors and logs.
    pub name: &'static str,
    /// Collection path template relative to the API root.
    pub path: &'static str,
    /// Supported operations.
    pub capabilities: CapabilitySet,
    /// Attribute identifying an object; `None` for singletons.
    pub id_attr: Option<&'static str>,
    /// Rules for create.
    pub create_attrs: RequiredOptional,
    /// Rules for update.
    pub update_attrs: RequiredOptional,
    /// Rules for list filters.
    pub list_filters: RequiredOptional,
    /// `(placeholder, parent attribute)` pairs used to scope nested managers.
    pub from_parent_attrs: &'static [(&'static str, &'static str)],
    /// What a save sends.
    pub update_policy: UpdatePolicy,
    /// Method used for updates.
    pub update_method: HttpMethod,
    /// Nested managers.
    pub children: &'static [ChildManager],
}

impl ResourceDefinition {
    /// Creates a definition with no capabilities, `id` as identifier and
    /// PUT updates.
    #[must_use]
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            capabilities: CapabilitySet::NONE,
            id_attr: Some("id"),
            create_attrs: RequiredOptional::EMPTY,
            update_attrs: RequiredOptional::EMPTY,
            list_filters: RequiredOptional::EMPTY,
            from_parent_attrs: &[],
            update_policy: UpdatePolicy::ChangedOnly,
            update_method: HttpMethod::Put,
            children: &[],
        }
    }

    /// Sets the supported operations.
    #[must_use]
    pub const fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the identifier attribute.
    #[must_use]
    pub const fn id_attr(mut self, id_attr: &'static str) -> Self {
        self.id_attr = Some(id_attr);
        self
    }

    /// Marks objects as identifier-less singletons.
    #[must_use]
    pub const fn without_id(mut self) -> Self {
        self.id_attr = None;
        self
    }

    /// Sets the create rules.
    #[must_use]
    pub const fn create_attrs(mut self, attrs: RequiredOptional) -> Self {
        self.create_attrs = attrs;
        self
    }

    /// Sets the update rules.
    #[must_use]
    pub const fn update_attrs(mut self, attrs: RequiredOptional) -> Self {
        self.update_attrs = attrs;
        self
    }

    /// Sets the list filter rules.
    #[must_use]
    pub const fn list_filters(mut self, filters: RequiredOptional) -> Self {
        self.list_filters = filters;
        self
    }

    /// Sets the parent attribute mapping for nested managers.
    #[must_use]
    pub const fn from_parent_attrs(
        mut self,
        mapping: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.from_parent_attrs = mapping;
        self
    }

    /// Sets the save policy.
    #[must_use]
    pub const fn update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Sets the update method.
    #[must_use]
    pub const fn update_method(mut self, method: HttpMethod) -> Self {
        self.update_method = method;
        self
    }

    /// Declares nested managers.
    #[must_use]
    pub const fn children(mut self, children: &'static [ChildManager]) -> Self {
        self.children = children;
        self
    }

    /// Returns `true` if the definition declares `capability`.
    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Looks up a nested manager by relation name.
    #[must_use]
    pub fn child(&self, relation: &str) -> Option<&'static ChildManager> {
        self.children.iter().find(|c| c.relation == relation)
    }

    /// Checks the definition for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidDefinition`] when the name or path is
    /// empty, the path template is malformed, `Get` is declared without an
    /// identifier attribute, the update method carries no body, or two
    /// children share a relation name.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let invalid = |reason: String| ResourceError::InvalidDefinition {
            resource: self.name,
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name cannot be empty".to_string()));
        }
        if self.path.trim().trim_matches('/').is_empty() {
            return Err(invalid("path cannot be empty".to_string()));
        }
        placeholders(self.path).map_err(invalid)?;

        if self.supports(Capability::Get) && self.id_attr.is_none() {
            return Err(invalid(
                "get requires an identifier attribute; use get_without_id for singletons"
                    .to_string(),
            ));
        }
        if !self.update_method.requires_body() {
            return Err(invalid(format!(
                "update method {} cannot carry a body",
                self.update_method
            )));
        }
        for (i, child) in self.children.iter().enumerate() {
            if self.children[..i].iter().any(|c| c.relation == child.relation) {
                return Err(invalid(format!(
                    "duplicate nested manager '{}'",
                    child.relation
                )));
            }
        }

        Ok(())
    }
}
