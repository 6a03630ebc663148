//! Semantic bindings attached to nodes by the front end's resolver.
//!
//! A [`Binding`] describes one declared symbol. Bindings form a tree through
//! `enclosing`: a method is enclosed by its class, a class by its library, a
//! local function by the method or function that declares it.
//!
//! The model is deliberately shallow: it records what the indexer consumes
//! (kinds, names, enclosing symbols, supertypes, members, field accessors,
//! and declaring units) and nothing about types of expressions.

use std::fmt;

use relindex_core::resource::UnitHandle;
use serde::{Deserialize, Serialize};

use crate::nodes::SourceRange;

/// Index of a binding in a [`SemanticModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub u32);

impl BindingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// What kind of symbol a binding declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingKind {
    Library,
    Class {
        #[serde(default)]
        is_interface: bool,
        /// Direct superclass.
        #[serde(default)]
        supertype: Option<BindingId>,
        /// Direct interfaces, in declaration order.
        #[serde(default)]
        interfaces: Vec<BindingId>,
        /// Methods, fields and accessors (not constructors).
        #[serde(default)]
        members: Vec<BindingId>,
        #[serde(default)]
        constructors: Vec<BindingId>,
        /// Class named by an interface's `default` clause.
        #[serde(default)]
        default_class: Option<BindingId>,
    },
    /// Method, constructor, operator, or function (top-level or local).
    Method {
        #[serde(default)]
        is_constructor: bool,
    },
    /// Field or top-level variable.
    Field {
        #[serde(default)]
        has_getter: bool,
        #[serde(default)]
        has_setter: bool,
    },
    /// Local variable or parameter.
    Variable,
    FunctionTypeAlias,
}

/// A declared symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Simple name. Empty for anonymous functions.
    pub name: String,
    #[serde(flatten)]
    pub kind: BindingKind,
    /// Enclosing symbol (library, class, method or function).
    #[serde(default)]
    pub enclosing: Option<BindingId>,
    /// Unit declaring the symbol, when known.
    #[serde(default)]
    pub unit: Option<UnitHandle>,
    /// Span of the declared name in the declaring unit.
    #[serde(default)]
    pub name_range: Option<SourceRange>,
}

impl Binding {
    /// Create a binding with no enclosing symbol and no declaring unit.
    pub fn new(name: impl Into<String>, kind: BindingKind) -> Self {
        Binding {
            name: name.into(),
            kind,
            enclosing: None,
            unit: None,
            name_range: None,
        }
    }

    pub fn with_enclosing(mut self, enclosing: BindingId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<UnitHandle>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_name_range(mut self, range: SourceRange) -> Self {
        self.name_range = Some(range);
        self
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, BindingKind::Class { .. })
    }

    /// Methods, constructors and functions.
    pub fn is_method(&self) -> bool {
        matches!(self.kind, BindingKind::Method { .. })
    }

    pub fn is_constructor(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::Method {
                is_constructor: true
            }
        )
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, BindingKind::Field { .. })
    }

    /// Interface flag of a class binding; `None` for other kinds.
    pub fn is_interface(&self) -> Option<bool> {
        match self.kind {
            BindingKind::Class { is_interface, .. } => Some(is_interface),
            _ => None,
        }
    }
}

// ============================================================================
// Semantic Model
// ============================================================================

/// All bindings of a workspace, addressed by [`BindingId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticModel {
    bindings: Vec<Binding>,
}

impl SemanticModel {
    pub fn new() -> Self {
        SemanticModel::default()
    }

    /// Add a binding and return its id.
    pub fn add(&mut self, binding: Binding) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(binding);
        id
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Register `member` with its class: as a constructor when it is one,
    /// otherwise as a member.
    ///
    /// Does nothing if `class` is not a class binding.
    pub fn add_member(&mut self, class: BindingId, member: BindingId) {
        let is_constructor = self.get(member).is_some_and(Binding::is_constructor);
        if let Some(BindingKind::Class {
            members,
            constructors,
            ..
        }) = self.kind_mut(class)
        {
            if is_constructor {
                constructors.push(member);
            } else {
                members.push(member);
            }
        }
    }

    pub fn set_supertype(&mut self, class: BindingId, supertype: BindingId) {
        if let Some(BindingKind::Class { supertype: s, .. }) = self.kind_mut(class) {
            *s = Some(supertype);
        }
    }

    pub fn add_interface(&mut self, class: BindingId, interface: BindingId) {
        if let Some(BindingKind::Class { interfaces, .. }) = self.kind_mut(class) {
            interfaces.push(interface);
        }
    }

    pub fn set_default_class(&mut self, interface: BindingId, class: BindingId) {
        if let Some(BindingKind::Class { default_class, .. }) = self.kind_mut(interface) {
            *default_class = Some(class);
        }
    }

    /// Direct superclass of a class binding.
    pub fn superclass(&self, class: BindingId) -> Option<BindingId> {
        match self.get(class)?.kind {
            BindingKind::Class { supertype, .. } => supertype,
            _ => None,
        }
    }

    /// Direct superclass followed by direct interfaces.
    pub fn supertypes(&self, class: BindingId) -> Vec<BindingId> {
        match self.get(class).map(|b| &b.kind) {
            Some(BindingKind::Class {
                supertype,
                interfaces,
                ..
            }) => supertype.iter().chain(interfaces).copied().collect(),
            _ => Vec::new(),
        }
    }

    fn kind_mut(&mut self, id: BindingId) -> Option<&mut BindingKind> {
        self.bindings.get_mut(id.index()).map(|b| &mut b.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> Binding {
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
    }

    #[test]
    fn members_and_constructors_are_separated() {
        let mut model = SemanticModel::new();
        let a = model.add(class("A"));
        let ctor = model.add(
            Binding::new("A", BindingKind::Method { is_constructor: true }).with_enclosing(a),
        );
        let m = model.add(
            Binding::new("m", BindingKind::Method { is_constructor: false }).with_enclosing(a),
        );
        model.add_member(a, ctor);
        model.add_member(a, m);

        match &model.get(a).unwrap().kind {
            BindingKind::Class {
                members,
                constructors,
                ..
            } => {
                assert_eq!(members, &vec![m]);
                assert_eq!(constructors, &vec![ctor]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn supertypes_lists_superclass_first() {
        let mut model = SemanticModel::new();
        let a = model.add(class("A"));
        let i = model.add(class("I"));
        let b = model.add(class("B"));
        model.add_interface(b, i);
        model.set_supertype(b, a);
        assert_eq!(model.supertypes(b), vec![a, i]);
        assert_eq!(model.superclass(b), Some(a));
        assert_eq!(model.superclass(a), None);
    }

    #[test]
    fn mutators_ignore_non_class_bindings() {
        let mut model = SemanticModel::new();
        let v = model.add(Binding::new("v", BindingKind::Variable));
        let a = model.add(class("A"));
        model.set_supertype(v, a);
        model.add_member(v, a);
        assert_eq!(model.get(v).unwrap().kind, BindingKind::Variable);
        assert!(model.get(BindingId(99)).is_none());
    }

    #[test]
    fn deserializes_from_tagged_json() {
        let json = r#"[
            {"name": "lib", "kind": "library"},
            {"name": "A", "kind": "class", "enclosing": 0, "unit": "lib/a.dart",
             "name_range": {"offset": 6, "length": 1}},
            {"name": "x", "kind": "field", "has_getter": true, "enclosing": 1}
        ]"#;
        let model: SemanticModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.len(), 3);
        let a = model.get(BindingId(1)).unwrap();
        assert_eq!(a.is_interface(), Some(false));
        assert_eq!(a.unit, Some(UnitHandle::new("lib/a.dart")));
        assert_eq!(
            model.get(BindingId(2)).unwrap().kind,
            BindingKind::Field {
                has_getter: true,
                has_setter: false
            }
        );
    }
}
