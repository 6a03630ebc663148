//! Shared fixtures for contributor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use relindex_ast::{Binding, BindingId, BindingKind, SemanticModel, Unit};
use relindex_contributor::{
    contribute, BindingLocator, ContributionSummary, ContributorOptions, IndexContext,
};
use relindex_core::element::Element;
use relindex_core::error::LookupError;
use relindex_core::location::Location;
use relindex_core::relationship::{Relationship, RelationshipKind};
use relindex_core::resource::{Resource, ResourceResolver, SourceProvider, UnitHandle};
use relindex_core::store::MemoryIndex;

/// Units known to a test run.
///
/// A unit's resource is named after its handle.
#[derive(Debug, Default)]
pub struct TestWorkspace {
    resources: HashMap<UnitHandle, Resource>,
    libraries: HashMap<UnitHandle, UnitHandle>,
    sources: HashMap<UnitHandle, String>,
}

impl TestWorkspace {
    pub fn new() -> Self {
        TestWorkspace::default()
    }

    /// Register a unit owned by `library`, with optional source text.
    pub fn unit(mut self, handle: &str, library: &str, source: Option<&str>) -> Self {
        let handle = UnitHandle::new(handle);
        self.resources
            .insert(handle.clone(), Resource::new(handle.as_str()));
        self.libraries
            .insert(handle.clone(), UnitHandle::new(library));
        if let Some(source) = source {
            self.sources.insert(handle, source.to_string());
        }
        self
    }

    /// Register a unit whose own resource cannot be resolved.
    pub fn unit_without_resource(mut self, handle: &str, library: &str) -> Self {
        self.libraries
            .insert(UnitHandle::new(handle), UnitHandle::new(library));
        self
    }
}

impl ResourceResolver for TestWorkspace {
    fn resource(&self, unit: &UnitHandle) -> Result<Resource, LookupError> {
        self.resources
            .get(unit)
            .cloned()
            .ok_or_else(|| LookupError::ResourceNotFound { unit: unit.clone() })
    }

    fn library_unit(&self, unit: &UnitHandle) -> Result<UnitHandle, LookupError> {
        self.libraries
            .get(unit)
            .cloned()
            .ok_or_else(|| LookupError::LibraryNotFound { unit: unit.clone() })
    }
}

impl SourceProvider for TestWorkspace {
    fn source(&self, unit: &UnitHandle) -> Result<String, LookupError> {
        self.sources
            .get(unit)
            .cloned()
            .ok_or_else(|| LookupError::SourceUnavailable {
                unit: unit.clone(),
                reason: "not in workspace".to_string(),
            })
    }
}

/// Index `unit` into a fresh store with tracing on.
pub fn index(
    workspace: &TestWorkspace,
    unit: &Unit,
    model: &SemanticModel,
) -> (MemoryIndex, ContributionSummary) {
    let store = MemoryIndex::new();
    let locator = BindingLocator::new(workspace);
    let ctx = IndexContext {
        store: &store,
        resources: workspace,
        elements: &locator,
        sources: workspace,
    };
    let summary = contribute(&ctx, unit, model, &ContributorOptions::traced())
        .expect("library resolves");
    (store, summary)
}

pub fn el(resource: &str, id: &str) -> Element {
    Element::new(Resource::new(resource), id)
}

pub fn loc(resource: &str, id: &str, offset: usize, length: usize) -> Location {
    Location::new(el(resource, id), offset, length)
}

pub fn library(resource: &str) -> Element {
    Element::library(Resource::new(resource))
}

/// Relationships contributed by `resource` whose subject is `subject`.
pub fn about(store: &MemoryIndex, resource: &str, subject: &Element) -> Vec<Relationship> {
    store
        .contributions(&Resource::new(resource))
        .into_iter()
        .filter(|r| &r.subject == subject)
        .collect()
}

/// Number of relationships of `kind` contributed by `resource`.
pub fn count_kind(store: &MemoryIndex, resource: &str, kind: RelationshipKind) -> usize {
    store
        .contributions(&Resource::new(resource))
        .iter()
        .filter(|r| r.kind == kind)
        .count()
}

// ============================================================================
// Bindings
// ============================================================================

pub fn class_kind(is_interface: bool) -> BindingKind {
    BindingKind::Class {
        is_interface,
        supertype: None,
        interfaces: vec![],
        members: vec![],
        constructors: vec![],
        default_class: None,
    }
}

pub fn add_library(model: &mut SemanticModel, unit: &str) -> BindingId {
    model.add(Binding::new("lib", BindingKind::Library).with_unit(unit))
}

pub fn add_class(
    model: &mut SemanticModel,
    name: &str,
    is_interface: bool,
    library: BindingId,
    unit: &str,
) -> BindingId {
    model.add(
        Binding::new(name, class_kind(is_interface))
            .with_enclosing(library)
            .with_unit(unit),
    )
}

/// Method (or constructor) registered with its class.
pub fn add_method(
    model: &mut SemanticModel,
    name: &str,
    class: BindingId,
    is_constructor: bool,
) -> BindingId {
    let method = model.add(
        Binding::new(name, BindingKind::Method { is_constructor }).with_enclosing(class),
    );
    model.add_member(class, method);
    method
}

pub fn add_field(
    model: &mut SemanticModel,
    name: &str,
    class: BindingId,
    has_getter: bool,
    has_setter: bool,
) -> BindingId {
    let field = model.add(
        Binding::new(
            name,
            BindingKind::Field {
                has_getter,
                has_setter,
            },
        )
        .with_enclosing(class),
    );
    model.add_member(class, field);
    field
}

pub fn add_variable(model: &mut SemanticModel, name: &str, enclosing: BindingId) -> BindingId {
    model.add(Binding::new(name, BindingKind::Variable).with_enclosing(enclosing))
}
