//! JSON output types for CLI responses.
//!
//! All responses carry `status` and `schema_version`. Output is
//! deterministic: relationships are sorted before emission and the same
//! input produces identical bytes.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{IndexError, OutputErrorCode};
use crate::location::Location;
use crate::relationship::{Relationship, RelationshipKind};
use crate::resource::Resource;
use crate::text::byte_offset_to_position;

/// Version of the JSON output schema.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Building Blocks
// ============================================================================

/// An element as it appears in output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOutput {
    pub resource: String,
    pub id: String,
}

impl From<&Element> for ElementOutput {
    fn from(element: &Element) -> Self {
        ElementOutput {
            resource: element.resource.id().to_string(),
            id: element.id.clone(),
        }
    }
}

/// A location as it appears in output.
///
/// `line`/`col` are present when the source text of the contributing unit
/// was available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOutput {
    pub element: ElementOutput,
    pub offset: usize,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
}

impl LocationOutput {
    /// Convert a location, computing line:col from `source` when given.
    pub fn from_location(location: &Location, source: Option<&str>) -> Self {
        let (line, col) = match source {
            Some(text) => {
                let (line, col) = byte_offset_to_position(text, location.offset);
                (Some(line), Some(col))
            }
            None => (None, None),
        };
        LocationOutput {
            element: ElementOutput::from(&location.element),
            offset: location.offset,
            length: location.length,
            line,
            col,
        }
    }
}

/// A recorded relationship as it appears in output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipOutput {
    /// Resource that contributed the relationship.
    pub resource: String,
    pub subject: ElementOutput,
    pub kind: RelationshipKind,
    pub location: LocationOutput,
}

impl RelationshipOutput {
    /// Convert a stored relationship.
    pub fn new(resource: &Resource, relationship: &Relationship, source: Option<&str>) -> Self {
        RelationshipOutput {
            resource: resource.id().to_string(),
            subject: ElementOutput::from(&relationship.subject),
            kind: relationship.kind,
            location: LocationOutput::from_location(&relationship.location, source),
        }
    }
}

/// Per-unit indexing statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: String,
    pub relationship_count: usize,
    /// Time spent mapping bindings to elements, in microseconds.
    pub binding_time_us: u64,
    pub resolution_misses: usize,
    pub location_misses: usize,
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `relindex index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
    pub schema_version: String,
    pub units: Vec<UnitReport>,
    pub total_relationships: usize,
    pub relationships: Vec<RelationshipOutput>,
}

impl IndexResponse {
    /// Create a successful response, sorting relationships for stable output.
    pub fn new(units: Vec<UnitReport>, mut relationships: Vec<RelationshipOutput>) -> Self {
        relationships.sort_by(|a, b| {
            (&a.resource, a.location.offset, a.kind, &a.subject.resource, &a.subject.id).cmp(&(
                &b.resource,
                b.location.offset,
                b.kind,
                &b.subject.resource,
                &b.subject.id,
            ))
        });
        IndexResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            total_relationships: relationships.len(),
            units,
            relationships,
        }
    }
}

/// Response for `relindex query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    pub schema_version: String,
    pub element: ElementOutput,
    pub kind: RelationshipKind,
    pub locations: Vec<LocationOutput>,
}

impl QueryResponse {
    /// Create a successful query response.
    pub fn new(element: &Element, kind: RelationshipKind, locations: Vec<LocationOutput>) -> Self {
        QueryResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            element: ElementOutput::from(element),
            kind,
            locations,
        }
    }
}

/// Error details in an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from an IndexError.
    pub fn from_error(err: &IndexError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response.
    pub fn new(err: &IndexError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for the CLI.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(offset: usize, kind: RelationshipKind) -> RelationshipOutput {
        let resource = Resource::new("a.dart");
        let rel = Relationship::new(
            Element::library(resource.clone()),
            kind,
            Location::new(Element::new(resource.clone(), "A"), offset, 1),
        );
        RelationshipOutput::new(&resource, &rel, None)
    }

    #[test]
    fn location_without_source_omits_line_col() {
        let out = relationship(3, RelationshipKind::DefinesClass);
        let json = serde_json::to_string(&out.location).unwrap();
        assert!(!json.contains("line"));
        assert!(!json.contains("col"));
    }

    #[test]
    fn location_with_source_has_line_col() {
        let loc = Location::new(Element::library(Resource::new("a.dart")), 10, 1);
        let out = LocationOutput::from_location(&loc, Some("class A {\n  m() {}\n}"));
        assert_eq!(out.line, Some(2));
        assert_eq!(out.col, Some(1));
    }

    #[test]
    fn index_response_sorts_relationships() {
        let response = IndexResponse::new(
            vec![],
            vec![
                relationship(9, RelationshipKind::DefinesMethod),
                relationship(1, RelationshipKind::DefinesClass),
                relationship(1, RelationshipKind::DefinesInterface),
            ],
        );
        let order: Vec<_> = response
            .relationships
            .iter()
            .map(|r| (r.location.offset, r.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, RelationshipKind::DefinesClass),
                (1, RelationshipKind::DefinesInterface),
                (9, RelationshipKind::DefinesMethod),
            ]
        );
        assert_eq!(response.total_relationships, 3);
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn error_response_carries_code() {
        let err = IndexError::invalid_args("missing snapshot path");
        let response = ErrorResponse::new(&err);
        assert_eq!(response.status, "error");
        assert_eq!(response.error.code, 2);
        let mut buf = Vec::new();
        emit_response(&response, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"code\": 2"));
    }
}
