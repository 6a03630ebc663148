//! Relationship kinds and recorded relationships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::location::Location;

// ============================================================================
// Relationship Kind
// ============================================================================

/// Kind of a directed edge from a subject element to a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    DefinesClass,
    DefinesInterface,
    DefinesMethod,
    DefinesField,
    DefinesFunction,
    DefinesFunctionType,
    DefinesVariable,
    Extends,
    IsExtendedBy,
    Implements,
    IsImplementedBy,
    IsInvokedByQualified,
    IsInvokedByUnqualified,
    IsAccessedByQualified,
    IsAccessedByUnqualified,
    IsModifiedByQualified,
    IsModifiedByUnqualified,
    IsReferencedBy,
    IsOverriddenBy,
}

impl RelationshipKind {
    /// Every kind, in declaration order.
    pub const ALL: [RelationshipKind; 19] = [
        RelationshipKind::DefinesClass,
        RelationshipKind::DefinesInterface,
        RelationshipKind::DefinesMethod,
        RelationshipKind::DefinesField,
        RelationshipKind::DefinesFunction,
        RelationshipKind::DefinesFunctionType,
        RelationshipKind::DefinesVariable,
        RelationshipKind::Extends,
        RelationshipKind::IsExtendedBy,
        RelationshipKind::Implements,
        RelationshipKind::IsImplementedBy,
        RelationshipKind::IsInvokedByQualified,
        RelationshipKind::IsInvokedByUnqualified,
        RelationshipKind::IsAccessedByQualified,
        RelationshipKind::IsAccessedByUnqualified,
        RelationshipKind::IsModifiedByQualified,
        RelationshipKind::IsModifiedByUnqualified,
        RelationshipKind::IsReferencedBy,
        RelationshipKind::IsOverriddenBy,
    ];

    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::DefinesClass => "defines_class",
            RelationshipKind::DefinesInterface => "defines_interface",
            RelationshipKind::DefinesMethod => "defines_method",
            RelationshipKind::DefinesField => "defines_field",
            RelationshipKind::DefinesFunction => "defines_function",
            RelationshipKind::DefinesFunctionType => "defines_function_type",
            RelationshipKind::DefinesVariable => "defines_variable",
            RelationshipKind::Extends => "extends",
            RelationshipKind::IsExtendedBy => "is_extended_by",
            RelationshipKind::Implements => "implements",
            RelationshipKind::IsImplementedBy => "is_implemented_by",
            RelationshipKind::IsInvokedByQualified => "is_invoked_by_qualified",
            RelationshipKind::IsInvokedByUnqualified => "is_invoked_by_unqualified",
            RelationshipKind::IsAccessedByQualified => "is_accessed_by_qualified",
            RelationshipKind::IsAccessedByUnqualified => "is_accessed_by_unqualified",
            RelationshipKind::IsModifiedByQualified => "is_modified_by_qualified",
            RelationshipKind::IsModifiedByUnqualified => "is_modified_by_unqualified",
            RelationshipKind::IsReferencedBy => "is_referenced_by",
            RelationshipKind::IsOverriddenBy => "is_overridden_by",
        }
    }

    /// Whether this is one of the `DEFINES_*` kinds.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            RelationshipKind::DefinesClass
                | RelationshipKind::DefinesInterface
                | RelationshipKind::DefinesMethod
                | RelationshipKind::DefinesField
                | RelationshipKind::DefinesFunction
                | RelationshipKind::DefinesFunctionType
                | RelationshipKind::DefinesVariable
        )
    }

    /// Access kind for a field reference.
    pub fn field_access(modified: bool, qualified: bool) -> Self {
        match (modified, qualified) {
            (true, true) => RelationshipKind::IsModifiedByQualified,
            (true, false) => RelationshipKind::IsModifiedByUnqualified,
            (false, true) => RelationshipKind::IsAccessedByQualified,
            (false, false) => RelationshipKind::IsAccessedByUnqualified,
        }
    }

    /// Invocation kind for a call site.
    pub fn invocation(qualified: bool) -> Self {
        if qualified {
            RelationshipKind::IsInvokedByQualified
        } else {
            RelationshipKind::IsInvokedByUnqualified
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown relationship kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown relationship kind '{0}'")]
pub struct UnknownRelationshipKind(pub String);

impl FromStr for RelationshipKind {
    type Err = UnknownRelationshipKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RelationshipKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownRelationshipKind(s.to_string()))
    }
}

// ============================================================================
// Relationship
// ============================================================================

/// A recorded edge: `subject --kind--> location`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    pub subject: Element,
    pub kind: RelationshipKind,
    pub location: Location,
}

impl Relationship {
    /// Create a relationship.
    pub fn new(subject: Element, kind: RelationshipKind, location: Location) -> Self {
        Relationship {
            subject,
            kind,
            location,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.kind, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_kind() {
        for kind in RelationshipKind::ALL {
            assert_eq!(kind.as_str().parse::<RelationshipKind>(), Ok(kind));
        }
    }

    #[test]
    fn parse_accepts_dashes_and_case() {
        assert_eq!(
            "IS-INVOKED-BY-QUALIFIED".parse::<RelationshipKind>(),
            Ok(RelationshipKind::IsInvokedByQualified)
        );
        assert!("invoked".parse::<RelationshipKind>().is_err());
    }

    #[test]
    fn serde_name_matches_as_str() {
        let json = serde_json::to_string(&RelationshipKind::IsOverriddenBy).unwrap();
        assert_eq!(json, "\"is_overridden_by\"");
    }

    #[test]
    fn field_access_covers_all_combinations() {
        use RelationshipKind::*;
        assert_eq!(RelationshipKind::field_access(true, true), IsModifiedByQualified);
        assert_eq!(RelationshipKind::field_access(true, false), IsModifiedByUnqualified);
        assert_eq!(RelationshipKind::field_access(false, true), IsAccessedByQualified);
        assert_eq!(RelationshipKind::field_access(false, false), IsAccessedByUnqualified);
    }

    #[test]
    fn definition_kinds() {
        let defs: Vec<_> = RelationshipKind::ALL
            .iter()
            .filter(|k| k.is_definition())
            .collect();
        assert_eq!(defs.len(), 7);
        assert!(!RelationshipKind::Extends.is_definition());
    }
}
