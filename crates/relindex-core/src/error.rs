//! Error types and error code constants for relindex.
//!
//! Two layers:
//! - [`LookupError`]: a collaborator could not answer (resource, library,
//!   declaring unit, source text). Inside a traversal these are logged and
//!   degrade to "no relationship"; they never abort the walk.
//! - [`IndexError`]: the unified error for the driver and CLI, with stable
//!   numeric codes via [`OutputErrorCode`].
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (unit, resource or library not found)
//! - `6`: Snapshot errors (unreadable or malformed workspace snapshot)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::resource::UnitHandle;

// ============================================================================
// Lookup Errors
// ============================================================================

/// A collaborator failed to map a unit, binding or source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No resource is known for the unit.
    #[error("no resource for compilation unit {unit}")]
    ResourceNotFound { unit: UnitHandle },

    /// The library owning the unit has no defining unit.
    #[error("no library defines compilation unit {unit}")]
    LibraryNotFound { unit: UnitHandle },

    /// The unit declaring a binding cannot be located.
    #[error("declaring unit of '{name}' cannot be located")]
    DeclaringUnitUnknown { name: String },

    /// A binding is nested in an anonymous declaration and has no stable id.
    #[error("'{name}' is declared inside an anonymous scope")]
    AnonymousScope { name: String },

    /// The enclosing chain of a binding loops back on itself.
    #[error("enclosing chain of '{name}' is cyclic")]
    EnclosingCycle { name: String },

    /// The binding id does not exist in the semantic model.
    #[error("unknown binding {index}")]
    UnknownBinding { index: u32 },

    /// The source text of the unit cannot be read.
    #[error("source not available for {unit}: {reason}")]
    SourceUnavailable { unit: UnitHandle, reason: String },
}

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Unit, resource or library could not be resolved.
    ResolutionError = 3,
    /// Workspace snapshot unreadable or malformed.
    SnapshotError = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the driver and CLI output.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A collaborator lookup failed outside of a traversal.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The workspace snapshot could not be read or parsed.
    #[error("snapshot error at {path}: {reason}")]
    Snapshot { path: String, reason: String },

    /// A unit's node arena is malformed.
    #[error("invalid unit {unit}: {reason}")]
    InvalidUnit { unit: String, reason: String },

    /// A contributor could not be created for a unit.
    #[error("cannot index {unit}: {reason}")]
    Contributor { unit: String, reason: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&IndexError> for OutputErrorCode {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            IndexError::Lookup(_) => OutputErrorCode::ResolutionError,
            IndexError::Snapshot { .. } => OutputErrorCode::SnapshotError,
            IndexError::InvalidUnit { .. } => OutputErrorCode::SnapshotError,
            IndexError::Contributor { .. } => OutputErrorCode::ResolutionError,
            IndexError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl IndexError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        IndexError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a snapshot error.
    pub fn snapshot(path: impl Into<String>, reason: impl Into<String>) -> Self {
        IndexError::Snapshot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        IndexError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn lookup_maps_to_resolution_error() {
            let err: IndexError = LookupError::LibraryNotFound {
                unit: UnitHandle::new("lib/a.dart"),
            }
            .into();
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn snapshot_maps_to_snapshot_error() {
            let err = IndexError::snapshot("ws.json", "expected value at line 1");
            assert_eq!(err.error_code().code(), 6);
        }

        #[test]
        fn invalid_args_maps_to_invalid_arguments() {
            assert_eq!(IndexError::invalid_args("x").error_code().code(), 2);
            assert_eq!(IndexError::internal("x").error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn lookup_error_is_transparent() {
            let err: IndexError = LookupError::ResourceNotFound {
                unit: UnitHandle::new("lib/a.dart"),
            }
            .into();
            assert_eq!(err.to_string(), "no resource for compilation unit lib/a.dart");
        }

        #[test]
        fn declaring_unit_names_binding() {
            let err = LookupError::DeclaringUnitUnknown {
                name: "Shape.area".to_string(),
            };
            assert_eq!(err.to_string(), "declaring unit of 'Shape.area' cannot be located");
        }
    }
}
