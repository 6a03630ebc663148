//! Compilation units, resources, and the collaborators that map between them.
//!
//! A [`UnitHandle`] names one compilation unit the way the host names it
//! (typically a workspace-relative path). A [`Resource`] is the stable index
//! identity derived from a handle. The two are kept distinct because the
//! mapping belongs to the host: the indexer asks a [`ResourceResolver`] for it
//! and never derives a resource on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Resource id of the index's global root.
pub const UNIVERSE_RESOURCE_ID: &str = "#universe";

// ============================================================================
// Unit Handle
// ============================================================================

/// Host-side handle of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitHandle(String);

impl UnitHandle {
    /// Create a new unit handle.
    pub fn new(handle: impl Into<String>) -> Self {
        UnitHandle(handle.into())
    }

    /// The handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitHandle {
    fn from(s: &str) -> Self {
        UnitHandle::new(s)
    }
}

// ============================================================================
// Resource
// ============================================================================

/// Stable index identity of a compilation unit.
///
/// Relationships are recorded *against* a resource: every relationship
/// contributed while visiting a unit is owned by that unit's resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Create a resource with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Resource(id.into())
    }

    /// The resource owning the global root element.
    pub fn universe() -> Self {
        Resource(UNIVERSE_RESOURCE_ID.to_string())
    }

    /// The resource id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Maps unit handles to resources and to their owning library.
///
/// Implementations must be shareable across threads: several contributors
/// for different units may consult the same resolver concurrently.
pub trait ResourceResolver: Send + Sync {
    /// Return the resource for the given compilation unit.
    fn resource(&self, unit: &UnitHandle) -> Result<Resource, LookupError>;

    /// Return the handle of the unit that defines the library owning `unit`.
    ///
    /// This can be `unit` itself.
    fn library_unit(&self, unit: &UnitHandle) -> Result<UnitHandle, LookupError>;
}

/// Fallible access to the raw source text of a compilation unit.
pub trait SourceProvider: Send + Sync {
    /// Return the full source text of `unit`.
    fn source(&self, unit: &UnitHandle) -> Result<String, LookupError>;
}
