//! Index elements: canonical identities of declared symbols.
//!
//! An [`Element`] is identified by the resource that declares it plus an id
//! string composed from the ids of its enclosing declarations:
//!
//! | Declaration | Id |
//! |-------------|----|
//! | class `A` | `A` |
//! | method `m` in `A` | `A.m` |
//! | second anonymous function in `A.m` | `A.m.1` |
//! | getter view of field `A.x` | `A.x#get` |
//!
//! Equality is structural over `(resource, id)`, so two contributors that
//! compute the same element for the same symbol in different units agree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Element id used for library elements.
pub const LIBRARY_ELEMENT_ID: &str = "#library";

/// Element id of the global root.
pub const UNIVERSE_ELEMENT_ID: &str = "#universe";

/// Separator between an enclosing element id and a local name.
pub const ID_SEPARATOR: char = '.';

/// Separator between a field id and an accessor suffix.
const ACCESSOR_SEPARATOR: char = '#';

// ============================================================================
// Element
// ============================================================================

/// Canonical identity of an indexable symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Element {
    /// Resource declaring the element.
    pub resource: Resource,
    /// Composed id, unique within the resource.
    pub id: String,
}

impl Element {
    /// Create an element.
    pub fn new(resource: Resource, id: impl Into<String>) -> Self {
        Element {
            resource,
            id: id.into(),
        }
    }

    /// The global root: parent scope of every library-level definition.
    pub fn universe() -> Self {
        Element::new(Resource::universe(), UNIVERSE_ELEMENT_ID)
    }

    /// The library element owned by the library-defining resource.
    pub fn library(resource: Resource) -> Self {
        Element::new(resource, LIBRARY_ELEMENT_ID)
    }

    /// Whether this is the global root.
    pub fn is_universe(&self) -> bool {
        self.id == UNIVERSE_ELEMENT_ID && self.resource == Resource::universe()
    }

    /// Element for a declaration named `name` nested inside `self`.
    pub fn child(&self, name: &str) -> Element {
        Element::new(self.resource.clone(), compose_element_id(Some(self), name))
    }

    /// Accessor view of the field represented by `self`.
    pub fn accessor(&self, accessor: Accessor) -> Element {
        Element::new(
            self.resource.clone(),
            format!("{}{}{}", self.id, ACCESSOR_SEPARATOR, accessor.as_str()),
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.resource, self.id)
    }
}

/// Compose an element id from an optional enclosing element and a local name.
///
/// Top-level declarations (no enclosing element) use the bare name.
pub fn compose_element_id(parent: Option<&Element>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent.id, ID_SEPARATOR, name),
        None => name.to_string(),
    }
}

// ============================================================================
// Field Accessors
// ============================================================================

/// Getter or setter view of a field.
///
/// Access and modification of one field are recorded against different views
/// when the field declares explicit accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    Getter,
    Setter,
}

impl Accessor {
    /// Suffix used in element ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessor::Getter => "get",
            Accessor::Setter => "set",
        }
    }
}
