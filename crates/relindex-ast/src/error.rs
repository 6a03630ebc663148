//! Errors raised while assembling a unit.

use relindex_core::error::IndexError;
use relindex_core::resource::UnitHandle;
use thiserror::Error;

use crate::nodes::NodeId;

/// A node arena that does not form a tree rooted at a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    /// The root id is out of range or not a compilation unit node.
    #[error("{unit}: root {root} is not a compilation unit node")]
    InvalidRoot { unit: UnitHandle, root: NodeId },

    /// A node refers to a child id outside the arena.
    #[error("{unit}: node {parent} refers to missing child {child}")]
    DanglingChild {
        unit: UnitHandle,
        parent: NodeId,
        child: NodeId,
    },

    /// A node is listed as the child of more than one node.
    #[error("{unit}: node {node} has more than one parent")]
    MultipleParents { unit: UnitHandle, node: NodeId },

    /// The root is listed as a child.
    #[error("{unit}: root {root} appears as a child")]
    RootHasParent { unit: UnitHandle, root: NodeId },

    /// A builder could not find a token in the unit's source text.
    #[error("{unit}: occurrence {nth} of '{token}' not found in source")]
    TokenNotFound {
        unit: UnitHandle,
        token: String,
        nth: usize,
    },
}

impl AstError {
    /// Handle of the unit being assembled.
    pub fn unit(&self) -> &UnitHandle {
        match self {
            AstError::InvalidRoot { unit, .. }
            | AstError::DanglingChild { unit, .. }
            | AstError::MultipleParents { unit, .. }
            | AstError::RootHasParent { unit, .. }
            | AstError::TokenNotFound { unit, .. } => unit,
        }
    }
}

impl From<AstError> for IndexError {
    fn from(err: AstError) -> Self {
        IndexError::InvalidUnit {
            unit: err.unit().to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relindex_core::error::OutputErrorCode;

    #[test]
    fn converts_to_invalid_unit() {
        let err = AstError::DanglingChild {
            unit: UnitHandle::new("lib/a.dart"),
            parent: NodeId(3),
            child: NodeId(40),
        };
        let index_err: IndexError = err.into();
        assert_eq!(index_err.error_code(), OutputErrorCode::SnapshotError);
        assert_eq!(
            index_err.to_string(),
            "invalid unit lib/a.dart: lib/a.dart: node #3 refers to missing child #40"
        );
    }
}
