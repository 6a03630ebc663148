//! The AST walker.
//!
//! [`IndexContributor`] implements [`Visitor`] over one unit. Declarations
//! open a scope for the walk below them and record `defines_*`; uses of
//! names record references, accesses, modifications and invocations.
//!
//! # Declarations and scopes
//!
//! | Node | Element id | Recorded |
//! |------|-----------|----------|
//! | class / interface | `A` | universe + library `defines_class`/`defines_interface`, supertypes |
//! | field | `A.x` | library `defines_field` (or `defines_variable` at top level) |
//! | method | `A.m`, `A.A.named` | library `defines_method`, override |
//! | function literal | `A.m.f`, `A.m.0` | library `defines_function` |
//! | function type alias | `F` | universe + library `defines_function_type` |
//!
//! A method that is a field's accessor belongs to the field, and the
//! function of a method belongs to the method; neither opens its own scope.
//!
//! # Locations
//!
//! Every location is owned by the innermost enclosing element, or by the
//! library element at the top of the unit. Declarations record their
//! `defines_*` after entering their own scope, so the location of a
//! definition is owned by the defined element.

use std::collections::HashSet;
use std::time::Duration;

use relindex_ast::nodes::{
    ArrayAccess, BinaryExpression, Class, CompilationUnit, Field, Function,
    FunctionObjectInvocation, FunctionTypeAlias, Identifier, MethodDefinition, MethodInvocation,
    NewExpression, RedirectConstructorInvocation, SuperConstructorInvocation, UnaryExpression,
    UnqualifiedInvocation,
};
use relindex_ast::{
    walk_unit, Binding, BindingId, BindingKind, NodeId, NodeKind, NodeRef, SemanticModel,
    SourceRange, Unit, VisitResult, Visitor,
};
use relindex_core::element::{compose_element_id, Element};
use relindex_core::error::LookupError;
use relindex_core::relationship::RelationshipKind;
use relindex_core::resource::{Resource, ResourceResolver, SourceProvider, UnitHandle};
use relindex_core::store::IndexStore;
use tracing::{debug, error, info, warn};

use crate::error::ContributorError;
use crate::identity::{ElementLocator, IdentityResolver};
use crate::location::LocationResolver;
use crate::options::ContributorOptions;
use crate::recorder::RelationshipRecorder;
use crate::scope::ScopeTracker;

// ============================================================================
// Context and Summary
// ============================================================================

/// Collaborators shared by every contributor of a run.
#[derive(Clone, Copy)]
pub struct IndexContext<'a> {
    pub store: &'a dyn IndexStore,
    pub resources: &'a dyn ResourceResolver,
    pub elements: &'a dyn ElementLocator,
    pub sources: &'a dyn SourceProvider,
}

/// Outcome of one traversal.
#[derive(Debug, Clone)]
pub struct ContributionSummary {
    pub unit: UnitHandle,
    /// Resource the relationships were recorded against.
    pub resource: Resource,
    pub relationship_count: usize,
    /// Time spent mapping bindings to elements.
    pub binding_time: Duration,
    /// Bindings that were absent or could not be mapped to an element.
    pub resolution_misses: usize,
    /// Operator tokens not found in the source text.
    pub location_misses: usize,
    /// Scopes left open at the end of the unit.
    pub residual_scopes: usize,
    pub trace: Option<Vec<String>>,
}

impl ContributionSummary {
    /// Emit the trace buffer, if any, as one log event.
    pub fn log_trace(&self) {
        if let Some(trace) = &self.trace {
            info!(unit = %self.unit, "{}", trace.join("\n"));
        }
    }
}

/// Index one unit with a fresh contributor.
pub fn contribute<'a>(
    ctx: &IndexContext<'a>,
    unit: &'a Unit,
    model: &'a SemanticModel,
    options: &ContributorOptions,
) -> Result<ContributionSummary, ContributorError> {
    Ok(IndexContributor::new(ctx, unit, model, options)?.contribute())
}

// ============================================================================
// IndexContributor
// ============================================================================

/// Walks one unit and records its relationships.
///
/// A contributor is bound to a single unit and consumed by
/// [`contribute`](IndexContributor::contribute).
pub struct IndexContributor<'a> {
    unit: &'a Unit,
    model: &'a SemanticModel,
    universe: Element,
    library_element: Element,
    scope: ScopeTracker,
    locations: LocationResolver<'a>,
    identity: IdentityResolver<'a>,
    recorder: RelationshipRecorder<'a>,
    resolution_misses: usize,
    location_misses: usize,
    residual_scopes: usize,
}

impl<'a> IndexContributor<'a> {
    /// Bind a contributor to `unit`.
    ///
    /// Fails only when the library owning the unit cannot be located. If the
    /// unit's own resource cannot be resolved, relationships are recorded
    /// against the library resource.
    pub fn new(
        ctx: &IndexContext<'a>,
        unit: &'a Unit,
        model: &'a SemanticModel,
        options: &ContributorOptions,
    ) -> Result<Self, ContributorError> {
        let handle = unit.handle();
        let library_resource = ctx
            .resources
            .library_unit(handle)
            .and_then(|library| ctx.resources.resource(&library))
            .map_err(|source| ContributorError::Library {
                unit: handle.clone(),
                source,
            })?;
        let resource = match ctx.resources.resource(handle) {
            Ok(resource) => resource,
            Err(err) => {
                warn!(unit = %handle, error = %err, "could not resolve resource; using library resource");
                library_resource.clone()
            }
        };
        let library_element = Element::library(library_resource);

        let mut recorder = RelationshipRecorder::new(ctx.store, resource, options.trace);
        recorder.note(|| format!("contributions from {}", handle));

        Ok(IndexContributor {
            unit,
            model,
            universe: Element::universe(),
            library_element: library_element.clone(),
            scope: ScopeTracker::new(),
            locations: LocationResolver::new(handle.clone(), ctx.sources, library_element),
            identity: IdentityResolver::new(model, ctx.elements),
            recorder,
            resolution_misses: 0,
            location_misses: 0,
            residual_scopes: 0,
        })
    }

    /// Walk the unit once, recording every relationship it contributes.
    pub fn contribute(mut self) -> ContributionSummary {
        let unit = self.unit;
        walk_unit(&mut self, unit);

        let summary = ContributionSummary {
            unit: unit.handle().clone(),
            resource: self.recorder.resource().clone(),
            relationship_count: self.recorder.count(),
            binding_time: self.identity.binding_time(),
            resolution_misses: self.resolution_misses,
            location_misses: self.location_misses,
            residual_scopes: self.residual_scopes,
            trace: self.recorder.into_trace(),
        };
        debug!(
            unit = %summary.unit,
            relationships = summary.relationship_count,
            binding_time_us = summary.binding_time.as_micros() as u64,
            resolution_misses = summary.resolution_misses,
            location_misses = summary.location_misses,
            "contributed relationships"
        );
        summary
    }

    // ------------------------------------------------------------------------
    // Elements and misses
    // ------------------------------------------------------------------------

    fn binding(&self, id: BindingId) -> Option<&'a Binding> {
        self.model.get(id)
    }

    /// The node's binding, if it is a method-like binding.
    fn method_binding(&self, node: NodeRef<'a>) -> Option<BindingId> {
        node.binding()
            .filter(|&b| self.binding(b).is_some_and(Binding::is_method))
    }

    /// Element of a declaration named `name` in the current scope.
    fn declared_element(&self, name: &str) -> Element {
        let parent = self.scope.innermost();
        let resource = match parent {
            Some(parent) => parent.resource.clone(),
            None => self.recorder.resource().clone(),
        };
        Element::new(resource, compose_element_id(parent, name))
    }

    fn element_of(&mut self, binding: BindingId) -> Option<Element> {
        match self.identity.element(binding) {
            Ok(element) => Some(element),
            Err(err) => {
                self.lookup_failed(binding, &err);
                None
            }
        }
    }

    fn lookup_failed(&mut self, binding: BindingId, err: &LookupError) {
        let model = self.model;
        let unit = self.unit.handle();
        let name = model.get(binding).map_or("?", |b| b.name.as_str());
        warn!(unit = %unit, binding = %binding, name, error = %err, "could not locate element");
        self.recorder
            .note(|| format!("element of {} not found in {}: {}", name, unit, err));
        self.resolution_misses += 1;
    }

    fn not_found(&mut self, what: &str, range: SourceRange) {
        let unit = self.unit.handle();
        debug!(unit = %unit, what, offset = range.offset, end = range.end(), "binding not found");
        self.recorder
            .note(|| format!("{} in {} [{}, {})", what, unit, range.offset, range.end()));
        self.resolution_misses += 1;
    }

    fn location_miss(&mut self, token: &str, start: usize, end: usize) {
        let unit = self.unit.handle();
        debug!(unit = %unit, token, start, end, "operator token not found");
        self.recorder
            .note(|| format!("operator {} in {} [{}, {})", token, unit, start, end));
        self.location_misses += 1;
    }

    /// Record `kind` from `subject` to `range` in the current scope.
    fn record_at(&mut self, subject: Option<&Element>, kind: RelationshipKind, range: SourceRange) {
        let location = self.locations.location(self.scope.innermost(), range);
        self.recorder.record(subject, kind, location);
    }

    /// Record a definition against the library, and also against the
    /// universe for library-level types.
    fn record_definition(&mut self, kind: RelationshipKind, range: SourceRange, universe: bool) {
        let location = self.locations.location(self.scope.innermost(), range);
        if universe {
            self.recorder
                .record(Some(&self.universe), kind, location.clone());
        }
        self.recorder
            .record(Some(&self.library_element), kind, location);
    }

    // ------------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------------

    fn record_supertype(&mut self, class: &'a Class, node: NodeRef<'a>, supertype: BindingId) {
        let name_range = range_of(node, class.name);
        let Some(super_binding) = self.binding(supertype) else {
            self.not_found("supertype", name_range);
            return;
        };
        let Some(super_element) = self.element_of(supertype) else {
            return;
        };
        let reference = class
            .supertypes
            .iter()
            .filter_map(|&t| node.get(t))
            .find(|t| t.binding() == Some(supertype))
            .map(type_name_range)
            .unwrap_or(name_range);
        let (inverse, forward) = if super_binding.is_interface() == Some(class.is_interface) {
            (RelationshipKind::IsExtendedBy, RelationshipKind::Extends)
        } else {
            (RelationshipKind::IsImplementedBy, RelationshipKind::Implements)
        };
        let class_element = self.scope.innermost().cloned();
        self.record_at(Some(&super_element), inverse, name_range);
        self.record_at(class_element.as_ref(), forward, reference);
    }

    fn record_type_reference(&mut self, node: NodeRef<'a>, class: BindingId) {
        let element = self.element_of(class);
        self.record_at(element.as_ref(), RelationshipKind::IsReferencedBy, node.range());
    }

    fn record_field_reference(&mut self, node: NodeRef<'a>, field: BindingId) {
        let assigned = is_assigned_to(node);
        let kind = RelationshipKind::field_access(assigned, is_qualified(node));
        let element = match self.identity.field_element(field, !assigned, assigned) {
            Ok(element) => Some(element),
            Err(err) => {
                self.lookup_failed(field, &err);
                None
            }
        };
        self.record_at(element.as_ref(), kind, node.range());
    }

    /// Record an invocation of `method` at the callee name.
    fn record_invocation(&mut self, site: NodeRef<'a>, name: Option<NodeRef<'a>>, method: BindingId) {
        let Some(name) = name else {
            self.not_found(site.kind().name(), site.range());
            return;
        };
        let kind = RelationshipKind::invocation(is_qualified(name));
        let element = self.element_of(method);
        self.record_at(element.as_ref(), kind, name.range());
    }

    /// Record an operator call site at an explicit span.
    fn record_operator(&mut self, method: BindingId, range: SourceRange) {
        let element = self.element_of(method);
        self.record_at(element.as_ref(), RelationshipKind::IsInvokedByQualified, range);
    }

    /// Find `token` in `[start, end)` and record the operator call there.
    fn record_operator_token(&mut self, method: BindingId, token: &str, start: usize, end: usize) {
        match self.locations.find_token(token, start, end) {
            Some(offset) => self.record_operator(method, SourceRange::new(offset, token.len())),
            None => self.location_miss(token, start, end),
        }
    }

    /// Binding for an unbound identifier, recovered from its parent.
    fn recover_binding(&self, node: NodeRef<'a>, parent: NodeRef<'a>) -> Option<BindingId> {
        match parent.kind() {
            NodeKind::TypeNode(_) => {
                let constructor = parent
                    .parent()
                    .filter(|g| matches!(g.kind(), NodeKind::NewExpression(_)))
                    .and_then(|g| g.binding());
                constructor.or_else(|| {
                    parent
                        .binding()
                        .filter(|&b| self.binding(b).is_some_and(Binding::is_class))
                })
            }
            NodeKind::MethodInvocation(inv) if inv.function_name == node.id() => parent.binding(),
            NodeKind::PropertyAccess(access) if access.name == node.id() => parent.binding(),
            NodeKind::UnqualifiedInvocation(inv) if inv.target == node.id() => parent.binding(),
            NodeKind::ParameterizedType(_) => {
                let class = parent.parent()?;
                let NodeKind::Class(decl) = class.kind() else {
                    return None;
                };
                if decl.default_class != Some(parent.id()) {
                    return None;
                }
                match &self.binding(class.binding()?)?.kind {
                    BindingKind::Class { default_class, .. } => *default_class,
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

// ============================================================================
// Visitor
// ============================================================================

impl<'a> Visitor<'a> for IndexContributor<'a> {
    fn visit_compilation_unit(&mut self, _node: NodeRef<'a>, _kind: &'a CompilationUnit) -> VisitResult {
        self.scope.begin_unit();
        VisitResult::Continue
    }

    fn leave_compilation_unit(&mut self, _node: NodeRef<'a>, _kind: &'a CompilationUnit) {
        let residual = self.scope.end_unit();
        if residual > 0 {
            error!(unit = %self.unit.handle(), residual, "scopes entered but not exited");
            self.residual_scopes = residual;
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn visit_class(&mut self, node: NodeRef<'a>, kind: &'a Class) -> VisitResult {
        let element = name_of(node, kind.name).map(|name| self.declared_element(name));
        self.scope.enter(element);

        let name_range = range_of(node, kind.name);
        let defines = if kind.is_interface {
            RelationshipKind::DefinesInterface
        } else {
            RelationshipKind::DefinesClass
        };
        self.record_definition(defines, name_range, true);

        let model = self.model;
        let binding = node
            .binding()
            .filter(|&b| model.get(b).is_some_and(Binding::is_class));
        match binding {
            Some(binding) => {
                for supertype in model.supertypes(binding) {
                    self.record_supertype(kind, node, supertype);
                }
            }
            None => self.not_found("class", node.range()),
        }
        VisitResult::Continue
    }

    fn leave_class(&mut self, _node: NodeRef<'a>, _kind: &'a Class) {
        self.scope.exit();
    }

    fn visit_field(&mut self, node: NodeRef<'a>, kind: &'a Field) -> VisitResult {
        let element = name_of(node, kind.name).map(|name| self.declared_element(name));
        self.scope.enter(element);

        let in_class = match node.binding().and_then(|b| self.binding(b)) {
            Some(binding) if binding.is_field() => binding
                .enclosing
                .and_then(|e| self.binding(e))
                .is_some_and(Binding::is_class),
            _ => node
                .ancestors()
                .nth(1)
                .is_some_and(|g| matches!(g.kind(), NodeKind::Class(_))),
        };
        let defines = if in_class {
            RelationshipKind::DefinesField
        } else {
            RelationshipKind::DefinesVariable
        };
        self.record_definition(defines, range_of(node, kind.name), false);
        VisitResult::Continue
    }

    fn leave_field(&mut self, _node: NodeRef<'a>, _kind: &'a Field) {
        self.scope.exit();
    }

    fn visit_method_definition(&mut self, node: NodeRef<'a>, kind: &'a MethodDefinition) -> VisitResult {
        if is_field_accessor(node) {
            return VisitResult::Continue;
        }
        let element = method_name(node, kind.name).map(|name| self.declared_element(&name));
        self.scope.enter(element);

        let name_range = range_of(node, kind.name);
        self.record_definition(RelationshipKind::DefinesMethod, name_range, false);

        match self.method_binding(node) {
            Some(method) => {
                if let Some(overridden) = find_overridden(self.model, method) {
                    let element = self.element_of(overridden);
                    self.record_at(element.as_ref(), RelationshipKind::IsOverriddenBy, name_range);
                }
            }
            None => self.not_found("method definition", node.range()),
        }
        VisitResult::Continue
    }

    fn leave_method_definition(&mut self, node: NodeRef<'a>, _kind: &'a MethodDefinition) {
        if !is_field_accessor(node) {
            self.scope.exit();
        }
    }

    fn visit_function(&mut self, node: NodeRef<'a>, _kind: &'a Function) -> VisitResult {
        if is_method_body(node) {
            return VisitResult::Continue;
        }
        let name_node = node.parent().and_then(|parent| match parent.kind() {
            NodeKind::FunctionExpression(expr) => expr.name.and_then(|n| parent.get(n)),
            _ => None,
        });
        let name = match name_node.and_then(|n| n.identifier_name()) {
            Some(name) => name.to_string(),
            None => self.scope.next_anonymous_ordinal().to_string(),
        };
        let element = self.declared_element(&name);
        self.scope.enter(Some(element));

        let range = name_node
            .map(|n| n.range())
            .or_else(|| {
                node.binding()
                    .and_then(|b| self.binding(b))
                    .and_then(|b| b.name_range)
            })
            .unwrap_or_else(|| node.range());
        self.record_definition(RelationshipKind::DefinesFunction, range, false);
        VisitResult::Continue
    }

    fn leave_function(&mut self, node: NodeRef<'a>, _kind: &'a Function) {
        if !is_method_body(node) {
            self.scope.exit();
        }
    }

    fn visit_function_type_alias(&mut self, node: NodeRef<'a>, kind: &'a FunctionTypeAlias) -> VisitResult {
        let element = name_of(node, kind.name).map(|name| self.declared_element(name));
        self.scope.enter(element);
        self.record_definition(
            RelationshipKind::DefinesFunctionType,
            range_of(node, kind.name),
            true,
        );
        VisitResult::Continue
    }

    fn leave_function_type_alias(&mut self, _node: NodeRef<'a>, _kind: &'a FunctionTypeAlias) {
        self.scope.exit();
    }

    // ------------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------------

    fn visit_identifier(&mut self, node: NodeRef<'a>, _kind: &'a Identifier) -> VisitResult {
        let Some(parent) = node.parent() else {
            return VisitResult::Continue;
        };
        if parent.kind().declared_name() == Some(node.id()) {
            return VisitResult::Continue;
        }
        let Some(binding) = node
            .binding()
            .or_else(|| self.recover_binding(node, parent))
        else {
            return VisitResult::Continue;
        };
        match self.binding(binding).map(|b| &b.kind) {
            Some(BindingKind::Class { .. }) => self.record_type_reference(node, binding),
            Some(BindingKind::Field { .. }) => self.record_field_reference(node, binding),
            // Local variables and parameters are not indexed; methods are
            // recorded by their invocation.
            _ => {}
        }
        VisitResult::Continue
    }

    // ------------------------------------------------------------------------
    // Invocations
    // ------------------------------------------------------------------------

    fn visit_method_invocation(&mut self, node: NodeRef<'a>, kind: &'a MethodInvocation) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => self.record_invocation(node, node.get(kind.function_name), method),
            None => self.not_found("method invocation", node.range()),
        }
        VisitResult::Continue
    }

    fn visit_unqualified_invocation(
        &mut self,
        node: NodeRef<'a>,
        kind: &'a UnqualifiedInvocation,
    ) -> VisitResult {
        let binding = node.binding();
        match binding.and_then(|b| self.binding(b)).map(|b| &b.kind) {
            Some(BindingKind::Method { .. }) => {
                if let Some(method) = binding {
                    self.record_invocation(node, node.get(kind.target), method);
                }
            }
            // Calling a closure held in a field or variable; the target
            // identifier records the access.
            Some(BindingKind::Field { .. }) | Some(BindingKind::Variable) => {}
            _ => self.not_found("unqualified invocation", node.range()),
        }
        VisitResult::Continue
    }

    fn visit_function_object_invocation(
        &mut self,
        node: NodeRef<'a>,
        kind: &'a FunctionObjectInvocation,
    ) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => {
                let name = node.get(kind.target).and_then(identifier_of);
                self.record_invocation(node, name, method);
            }
            None => self.not_found("function invocation", node.range()),
        }
        VisitResult::Continue
    }

    fn visit_new_expression(&mut self, node: NodeRef<'a>, kind: &'a NewExpression) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => {
                let name = node.get(kind.constructor).and_then(identifier_of);
                self.record_invocation(node, name, method);
            }
            None => self.not_found("new expression", node.range()),
        }
        VisitResult::Continue
    }

    fn visit_redirect_constructor_invocation(
        &mut self,
        node: NodeRef<'a>,
        kind: &'a RedirectConstructorInvocation,
    ) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => {
                let name = kind.name.and_then(|n| node.get(n));
                self.record_invocation(node, name, method);
            }
            None => self.not_found("redirect constructor invocation", node.range()),
        }
        VisitResult::Continue
    }

    fn visit_super_constructor_invocation(
        &mut self,
        node: NodeRef<'a>,
        kind: &'a SuperConstructorInvocation,
    ) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => {
                let name = kind.name.and_then(|n| node.get(n));
                self.record_invocation(node, name, method);
            }
            None => self.not_found("super constructor invocation", node.range()),
        }
        VisitResult::Continue
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn visit_binary_expression(&mut self, node: NodeRef<'a>, kind: &'a BinaryExpression) -> VisitResult {
        if !kind.operator.is_user_definable() {
            return VisitResult::Continue;
        }
        let token = kind.operator.syntax();
        match self.method_binding(node) {
            Some(method) => {
                let start = range_of(node, kind.left).end();
                let end = range_of(node, kind.right).offset;
                self.record_operator_token(method, token, start, end);
            }
            None => self.not_found(&format!("binary expression: {}", token), node.range()),
        }
        VisitResult::Continue
    }

    fn visit_unary_expression(&mut self, node: NodeRef<'a>, kind: &'a UnaryExpression) -> VisitResult {
        let token = kind.operator.syntax();
        match self.method_binding(node) {
            Some(method) => {
                let operand = range_of(node, kind.operand);
                let range = node.range();
                let (start, end) = if kind.prefix {
                    (range.offset, operand.offset)
                } else {
                    (operand.end(), range.end())
                };
                self.record_operator_token(method, token, start, end);
            }
            None if kind.operator.is_user_definable() => {
                self.not_found(&format!("unary expression: {}", token), node.range())
            }
            None => {}
        }
        VisitResult::Continue
    }

    fn visit_array_access(&mut self, node: NodeRef<'a>, kind: &'a ArrayAccess) -> VisitResult {
        match self.method_binding(node) {
            Some(method) => {
                let target = range_of(node, kind.target);
                let key = range_of(node, kind.key);
                match self.locations.bracket_span(target, key, node.range()) {
                    Some(span) => self.record_operator(method, span),
                    None => self.location_miss("[]", target.end(), node.range().end()),
                }
            }
            None => self.not_found("array access", node.range()),
        }
        VisitResult::Continue
    }
}

// ============================================================================
// Syntax helpers
// ============================================================================

/// Span of a child of `node`, or an empty span at the node's start.
fn range_of(node: NodeRef<'_>, child: NodeId) -> SourceRange {
    node.get(child)
        .map(|c| c.range())
        .unwrap_or_else(|| SourceRange::new(node.range().offset, 0))
}

fn name_of<'a>(node: NodeRef<'a>, child: NodeId) -> Option<&'a str> {
    node.get(child).and_then(|c| c.identifier_name())
}

/// Name of a method: `m`, or `A.named` for a named constructor.
fn method_name(node: NodeRef<'_>, name: NodeId) -> Option<String> {
    let name = node.get(name)?;
    match name.kind() {
        NodeKind::Identifier(ident) => Some(ident.name.clone()),
        NodeKind::PropertyAccess(access) => {
            let simple = name.get(access.name)?.identifier_name()?;
            match access.qualifier.and_then(|q| name.get(q)) {
                Some(qualifier) => Some(format!("{}.{}", qualifier.identifier_name()?, simple)),
                None => Some(simple.to_string()),
            }
        }
        _ => None,
    }
}

/// Span of the name in a type node.
fn type_name_range(type_node: NodeRef<'_>) -> SourceRange {
    match type_node.kind() {
        NodeKind::TypeNode(t) => range_of(type_node, t.identifier),
        _ => type_node.range(),
    }
}

fn is_field_accessor(node: NodeRef<'_>) -> bool {
    node.parent()
        .is_some_and(|p| matches!(p.kind(), NodeKind::Field(_)))
}

fn is_method_body(node: NodeRef<'_>) -> bool {
    node.parent()
        .is_some_and(|p| matches!(p.kind(), NodeKind::MethodDefinition(_)))
}

/// The identifier naming the callee of an invocation target.
fn identifier_of(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    match node.kind() {
        NodeKind::Identifier(_) => Some(node),
        NodeKind::PropertyAccess(access) => node.get(access.name),
        NodeKind::TypeNode(t) => node.get(t.identifier).and_then(identifier_of),
        _ => None,
    }
}

/// Whether a name takes part in member access: either side of a property
/// access, or the receiver or function name of a method invocation.
fn is_qualified(node: NodeRef<'_>) -> bool {
    node.parent().is_some_and(|p| {
        matches!(
            p.kind(),
            NodeKind::PropertyAccess(_) | NodeKind::MethodInvocation(_)
        )
    })
}

/// Whether the name is the target of an assignment.
///
/// Walks up from the name: the left operand of an assignment operator is
/// assigned; the qualifier of a property access, a statement, a class member
/// or a class ends the walk unassigned.
fn is_assigned_to(node: NodeRef<'_>) -> bool {
    let mut child = node;
    for parent in node.ancestors() {
        match parent.kind() {
            NodeKind::BinaryExpression(binary) => {
                if binary.operator.is_assignment() && binary.left == child.id() {
                    return true;
                }
            }
            NodeKind::PropertyAccess(access) => {
                if access.name != child.id() {
                    return false;
                }
            }
            kind if kind.is_statement() || kind.is_class_member() => return false,
            NodeKind::Class(_) => return false,
            _ => {}
        }
        child = parent;
    }
    false
}

/// Nearest method up the superclass chain that `method` overrides.
///
/// Constructors are matched against constructors, other methods against
/// non-constructor methods, by name only. Functions outside a class override
/// nothing.
pub fn find_overridden(model: &SemanticModel, method: BindingId) -> Option<BindingId> {
    let target = model.get(method)?;
    let is_constructor = target.is_constructor();
    let class = target.enclosing.filter(|&c| model.get(c).is_some_and(Binding::is_class))?;

    let mut visited = HashSet::from([class]);
    let mut current = model.superclass(class);
    while let Some(superclass) = current {
        if !visited.insert(superclass) {
            break;
        }
        if let Some(BindingKind::Class {
            members,
            constructors,
            ..
        }) = model.get(superclass).map(|b| &b.kind)
        {
            let candidates = if is_constructor { constructors } else { members };
            let found = candidates.iter().copied().find(|&c| {
                model.get(c).is_some_and(|b| {
                    b.is_method() && b.is_constructor() == is_constructor && b.name == target.name
                })
            });
            if found.is_some() {
                return found;
            }
        }
        current = model.superclass(superclass);
    }
    None
}
