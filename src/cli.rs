//! CLI front door.
//!
//! Provides the command helpers behind the `relindex` binary:
//! - `index` - Index every unit of a snapshot and emit all relationships
//! - `query` - Index, then list the locations of one element and kind
//!
//! ## Indexing
//!
//! Each unit gets its own contributor. Units are indexed on the rayon pool
//! against one shared [`MemoryIndex`] unless `sequential` is set; the
//! output is sorted, so both modes produce identical responses.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, IndexError>`. A unit whose library
//! cannot be located fails the whole run; misses inside a unit only show up
//! in its [`UnitReport`].

use std::collections::HashMap;

use rayon::prelude::*;
use relindex_ast::Unit;
use relindex_contributor::{
    contribute, BindingLocator, ContributionSummary, ContributorOptions, IndexContext,
};
use relindex_core::element::Element;
use relindex_core::error::IndexError;
use relindex_core::output::{
    IndexResponse, LocationOutput, QueryResponse, RelationshipOutput, UnitReport,
};
use relindex_core::relationship::RelationshipKind;
use relindex_core::resource::{Resource, SourceProvider, UnitHandle};
use relindex_core::store::MemoryIndex;
use tracing::{debug, info};

use crate::snapshot::Workspace;

/// What to index and how.
#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    /// Restrict indexing to these units; all units when empty.
    pub units: Vec<UnitHandle>,
    pub trace: bool,
    pub sequential: bool,
}

// ============================================================================
// Indexing
// ============================================================================

/// Index the requested units of `workspace` into `store`.
///
/// Summaries are returned in snapshot order.
pub fn index_workspace(
    workspace: &Workspace,
    store: &MemoryIndex,
    request: &IndexRequest,
) -> Result<Vec<ContributionSummary>, IndexError> {
    let units = select_units(workspace, &request.units)?;
    let locator = BindingLocator::new(workspace);
    let ctx = IndexContext {
        store,
        resources: workspace,
        elements: &locator,
        sources: workspace,
    };
    let options = ContributorOptions {
        trace: request.trace,
    };
    let model = workspace.model();

    let results: Vec<_> = if request.sequential {
        units
            .iter()
            .map(|unit| contribute(&ctx, unit, model, &options))
            .collect()
    } else {
        units
            .par_iter()
            .map(|unit| contribute(&ctx, unit, model, &options))
            .collect()
    };

    let mut summaries = Vec::with_capacity(results.len());
    for result in results {
        let summary = result?;
        if request.trace {
            summary.log_trace();
        }
        summaries.push(summary);
    }
    info!(
        units = summaries.len(),
        relationships = store.len(),
        "indexed workspace"
    );
    Ok(summaries)
}

fn select_units<'a>(
    workspace: &'a Workspace,
    filter: &[UnitHandle],
) -> Result<Vec<&'a Unit>, IndexError> {
    if filter.is_empty() {
        return Ok(workspace.units().iter().collect());
    }
    filter
        .iter()
        .map(|handle| {
            workspace
                .unit(handle)
                .ok_or_else(|| IndexError::invalid_args(format!("unit '{}' is not in the snapshot", handle)))
        })
        .collect()
}

/// Run `relindex index`.
pub fn run_index(workspace: &Workspace, request: &IndexRequest) -> Result<IndexResponse, IndexError> {
    let store = MemoryIndex::new();
    let summaries = index_workspace(workspace, &store, request)?;

    let units = summaries.iter().map(unit_report).collect();
    let mut sources = SourceCache::new(workspace);
    let relationships = store
        .all()
        .iter()
        .map(|(resource, relationship)| {
            let source = sources.get(resource);
            RelationshipOutput::new(resource, relationship, source)
        })
        .collect();
    Ok(IndexResponse::new(units, relationships))
}

/// Run `relindex query`: index, then look up `kind` for one element.
pub fn run_query(
    workspace: &Workspace,
    request: &IndexRequest,
    element: &Element,
    kind: RelationshipKind,
) -> Result<QueryResponse, IndexError> {
    let store = MemoryIndex::new();
    index_workspace(workspace, &store, request)?;

    // Positions come from the contributing unit: a location owned by the
    // library element may sit in another file of that library.
    let mut sources = SourceCache::new(workspace);
    let locations = store
        .contributed_locations(element, kind)
        .iter()
        .map(|(resource, location)| {
            let source = sources.get(resource);
            LocationOutput::from_location(location, source)
        })
        .collect();
    debug!(element = %element, kind = %kind, "query answered");
    Ok(QueryResponse::new(element, kind, locations))
}

fn unit_report(summary: &ContributionSummary) -> UnitReport {
    UnitReport {
        unit: summary.unit.to_string(),
        relationship_count: summary.relationship_count,
        binding_time_us: summary.binding_time.as_micros() as u64,
        resolution_misses: summary.resolution_misses,
        location_misses: summary.location_misses,
    }
}

// ============================================================================
// Source Cache
// ============================================================================

/// Source text per resource for line:column output, fetched once.
///
/// Resources are named after unit handles, so a resource id doubles as the
/// handle of the unit holding the text.
struct SourceCache<'a> {
    sources: &'a dyn SourceProvider,
    cache: HashMap<Resource, Option<String>>,
}

impl<'a> SourceCache<'a> {
    fn new(sources: &'a dyn SourceProvider) -> Self {
        SourceCache {
            sources,
            cache: HashMap::new(),
        }
    }

    fn get(&mut self, resource: &Resource) -> Option<&str> {
        let sources = self.sources;
        self.cache
            .entry(resource.clone())
            .or_insert_with(|| sources.source(&UnitHandle::new(resource.id())).ok())
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{UnitSnapshot, WorkspaceSnapshot};
    use relindex_ast::{Binding, BindingKind, SemanticModel, UnitBuilder};

    /// `lib/a.dart`: `class A {} class B extends A {}`.
    fn workspace() -> Workspace {
        let source = "class A {} class B extends A {}";
        let mut model = SemanticModel::new();
        let lib = model.add(Binding::new("lib", BindingKind::Library).with_unit("lib/a.dart"));
        let class = |name: &str| {
            Binding::new(
                name,
                BindingKind::Class {
                    is_interface: false,
                    supertype: None,
                    interfaces: vec![],
                    members: vec![],
                    constructors: vec![],
                    default_class: None,
                },
            )
            .with_enclosing(lib)
            .with_unit("lib/a.dart")
        };
        let a = model.add(class("A"));
        let b_binding = model.add(class("B"));
        model.set_supertype(b_binding, a);

        let mut b = UnitBuilder::new("lib/a.dart", source);
        let class_a = b.class("A", 0, false, vec![], vec![]);
        b.bind(class_a, a);
        let supertype = b.type_node("A", 1);
        b.bind(supertype, a);
        let class_b = b.class("B", 0, false, vec![supertype], vec![]);
        b.bind(class_b, b_binding);
        let unit = b.finish(vec![class_a, class_b]).unwrap();

        let snapshot = WorkspaceSnapshot {
            bindings: model,
            units: vec![UnitSnapshot {
                handle: UnitHandle::new("lib/a.dart"),
                library: None,
                source: Some(source.to_string()),
                root: unit.root(),
                nodes: unit.nodes().to_vec(),
            }],
            external_units: vec![],
        };
        Workspace::from_snapshot(snapshot, "").unwrap()
    }

    /// `lib/a.dart`: `class A {}`; its part `lib/b.dart`: `\n\nA x;`.
    fn library_with_part() -> Workspace {
        let (a_source, b_source) = ("class A {}", "\n\nA x;");
        let mut model = SemanticModel::new();
        let lib = model.add(Binding::new("lib", BindingKind::Library).with_unit("lib/a.dart"));
        let class_a = model.add(
            Binding::new(
                "A",
                BindingKind::Class {
                    is_interface: false,
                    supertype: None,
                    interfaces: vec![],
                    members: vec![],
                    constructors: vec![],
                    default_class: None,
                },
            )
            .with_enclosing(lib)
            .with_unit("lib/a.dart"),
        );
        let var_x = model.add(
            Binding::new(
                "x",
                BindingKind::Field {
                    has_getter: false,
                    has_setter: false,
                },
            )
            .with_enclosing(lib)
            .with_unit("lib/b.dart"),
        );

        let mut a = UnitBuilder::new("lib/a.dart", a_source);
        let class = a.class("A", 0, false, vec![], vec![]);
        a.bind(class, class_a);
        let a_unit = a.finish(vec![class]).unwrap();

        let mut b = UnitBuilder::new("lib/b.dart", b_source);
        let type_a = b.type_node("A", 0);
        b.bind(type_a, class_a);
        let x = b.field("x", 0, None);
        b.bind(x, var_x);
        let group = b.field_group(Some(type_a), vec![x]);
        let b_unit = b.finish(vec![group]).unwrap();

        let unit_snapshot = |unit: &Unit, library: Option<&str>, source: &str| UnitSnapshot {
            handle: unit.handle().clone(),
            library: library.map(UnitHandle::new),
            source: Some(source.to_string()),
            root: unit.root(),
            nodes: unit.nodes().to_vec(),
        };
        let snapshot = WorkspaceSnapshot {
            bindings: model,
            units: vec![
                unit_snapshot(&a_unit, None, a_source),
                unit_snapshot(&b_unit, Some("lib/a.dart"), b_source),
            ],
            external_units: vec![],
        };
        Workspace::from_snapshot(snapshot, "").unwrap()
    }

    mod index_tests {
        use super::*;

        #[test]
        fn sequential_and_parallel_agree() {
            let ws = workspace();
            let parallel = run_index(&ws, &IndexRequest::default()).unwrap();
            let sequential = run_index(
                &ws,
                &IndexRequest {
                    sequential: true,
                    ..IndexRequest::default()
                },
            )
            .unwrap();
            assert_eq!(parallel.relationships, sequential.relationships);
            assert_eq!(parallel.units, sequential.units);
        }

        #[test]
        fn report_counts_relationships() {
            let ws = workspace();
            let response = run_index(&ws, &IndexRequest::default()).unwrap();
            // 2 x (universe + library) defines, extends pair, one reference.
            assert_eq!(response.total_relationships, 7);
            assert_eq!(response.units.len(), 1);
            assert_eq!(response.units[0].relationship_count, 7);
            assert_eq!(response.units[0].resolution_misses, 0);
            assert!(response.relationships.iter().all(|r| r.location.line == Some(1)));
        }

        #[test]
        fn unknown_unit_filter_is_invalid() {
            let ws = workspace();
            let request = IndexRequest {
                units: vec![UnitHandle::new("lib/missing.dart")],
                ..IndexRequest::default()
            };
            let err = run_index(&ws, &request).unwrap_err();
            assert_eq!(err.error_code().code(), 2);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn query_lists_locations_with_positions() {
            let ws = workspace();
            let element = Element::new(Resource::new("lib/a.dart"), "A");
            let response = run_query(
                &ws,
                &IndexRequest::default(),
                &element,
                RelationshipKind::IsExtendedBy,
            )
            .unwrap();
            assert_eq!(response.locations.len(), 1);
            let location = &response.locations[0];
            assert_eq!(location.element.id, "B");
            assert_eq!(location.offset, 17);
            assert_eq!(location.col, Some(18));
        }

        #[test]
        fn positions_come_from_the_contributing_unit() {
            let ws = library_with_part();
            let element = Element::new(Resource::new("lib/a.dart"), "A");
            let response = run_query(
                &ws,
                &IndexRequest::default(),
                &element,
                RelationshipKind::IsReferencedBy,
            )
            .unwrap();
            assert_eq!(response.locations.len(), 1);
            let location = &response.locations[0];
            // Owned by the library element, found in the part.
            assert_eq!(location.element.id, "#library");
            assert_eq!(location.element.resource, "lib/a.dart");
            assert_eq!(location.offset, 2);
            assert_eq!(location.line, Some(3));
            assert_eq!(location.col, Some(1));
        }
    }
}
