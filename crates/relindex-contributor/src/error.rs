//! Errors that prevent a contributor from starting.

use relindex_core::error::{IndexError, LookupError};
use relindex_core::resource::UnitHandle;
use thiserror::Error;

/// A contributor could not be created.
///
/// Once created, a contributor never fails: misses during the walk are
/// logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContributorError {
    /// The library owning the unit, or its resource, cannot be located.
    #[error("cannot locate the library of {unit}")]
    Library {
        unit: UnitHandle,
        #[source]
        source: LookupError,
    },
}

impl From<ContributorError> for IndexError {
    fn from(err: ContributorError) -> Self {
        match &err {
            ContributorError::Library { unit, source } => IndexError::Contributor {
                unit: unit.to_string(),
                reason: format!("{}: {}", err, source),
            },
        }
    }
}
