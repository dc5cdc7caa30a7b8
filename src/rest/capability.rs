//! Operations a resource kind supports.

use std::fmt;

/// A single operation a manager may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Enumerate the collection.
    List,
    /// Fetch one object by identifier.
    Get,
    /// Fetch the singleton at the manager path.
    GetWithoutId,
    /// Create an object.
    Create,
    /// Update an object.
    Update,
    /// Delete an object.
    Delete,
    /// Re-fetch an existing object.
    Refresh,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::List,
        Self::Get,
        Self::GetWithoutId,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Refresh,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Returns the lowercase operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::GetWithoutId => "get_without_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Capability`] values, usable in `const` definitions.
///
/// # Example
///
/// ```rust
/// use gitlab_api::rest::{Capability, CapabilitySet};
///
/// const READ_AND_DELETE: CapabilitySet = CapabilitySet::RETRIEVE.with(Capability::Delete);
///
/// assert!(READ_AND_DELETE.contains(Capability::Get));
/// assert!(READ_AND_DELETE.contains(Capability::Delete));
/// assert!(!READ_AND_DELETE.contains(Capability::Create));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// No operations.
    pub const NONE: Self = Self(0);

    /// List, get and refresh.
    pub const RETRIEVE: Self = Self::NONE
        .with(Capability::List)
        .with(Capability::Get)
        .with(Capability::Refresh);

    /// Retrieve plus create, update and delete.
    pub const CRUD: Self = Self::RETRIEVE
        .with(Capability::Create)
        .with(Capability::Update)
        .with(Capability::Delete);

    /// Returns a copy with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Returns a copy with `capability` removed.
    #[must_use]
    pub const fn without(self, capability: Capability) -> Self {
        Self(self.0 & !capability.bit())
    }

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if `capability` is in the set.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the capabilities in the set.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
