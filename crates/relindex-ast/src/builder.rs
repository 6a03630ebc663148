//! Assembling units against real source text.
//!
//! [`UnitBuilder`] creates nodes whose spans are found by searching the
//! unit's source for their tokens, so a unit can be described by its source
//! plus the shape of its tree:
//!
//! ```ignore
//! let mut b = UnitBuilder::new("lib/a.dart", "class A { m() {} }");
//! let m = b.method("m", 0, vec![], None);
//! let a = b.class("A", 0, false, vec![], vec![m]);
//! let unit = b.finish(vec![a])?;
//! ```
//!
//! A token that cannot be found is reported by [`UnitBuilder::finish`].

use relindex_core::resource::UnitHandle;

use crate::binding::BindingId;
use crate::error::AstError;
use crate::nodes::{
    ArrayAccess, BinaryExpression, Block, Class, CompilationUnit, ExpressionStatement, Field,
    FieldDefinition, Function, FunctionExpression, FunctionObjectInvocation, FunctionTypeAlias,
    Identifier, Label, Literal, MethodDefinition, MethodInvocation, NewExpression, Node, NodeId,
    NodeKind, Operator, Parameter, ParameterizedType, PropertyAccess,
    RedirectConstructorInvocation, ReturnStatement, SourceRange, SuperConstructorInvocation,
    TypeNode, UnaryExpression, UnqualifiedInvocation, Variable, VariableStatement,
};
use crate::unit::Unit;

/// Byte offset of the `nth` (0-based) occurrence of `needle` in `source`.
///
/// When `needle` starts or ends with an identifier character, occurrences
/// embedded in a longer identifier are skipped, so `locate("class A", "a",
/// 0)` does not match inside `class`.
pub fn locate(source: &str, needle: &str, nth: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let word_start = needle.starts_with(is_ident_char);
    let word_end = needle.ends_with(is_ident_char);
    source
        .match_indices(needle)
        .map(|(offset, _)| offset)
        .filter(|&offset| {
            let before_ok =
                !word_start || !source[..offset].chars().next_back().is_some_and(is_ident_char);
            let after_ok = !word_end
                || !source[offset + needle.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_ident_char);
            before_ok && after_ok
        })
        .nth(nth)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ============================================================================
// UnitBuilder
// ============================================================================

/// Builds a [`Unit`] bottom-up: children first, then their parents.
#[derive(Debug)]
pub struct UnitBuilder {
    handle: UnitHandle,
    source: String,
    nodes: Vec<Node>,
    missing: Option<(String, usize)>,
}

impl UnitBuilder {
    pub fn new(handle: impl Into<UnitHandle>, source: impl Into<String>) -> Self {
        UnitBuilder {
            handle: handle.into(),
            source: source.into(),
            nodes: Vec::new(),
            missing: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Add a node with an explicit span.
    pub fn push(&mut self, kind: NodeKind, range: SourceRange) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, range));
        id
    }

    /// Attach a binding to a node. Returns the node for chaining.
    pub fn bind(&mut self, node: NodeId, binding: BindingId) -> NodeId {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.binding = Some(binding);
        }
        node
    }

    /// Span of a node built so far.
    pub fn range(&self, node: NodeId) -> SourceRange {
        self.nodes
            .get(node.index())
            .map(|n| n.range)
            .unwrap_or_default()
    }

    /// Smallest span covering the given nodes. Empty spans are ignored.
    pub fn cover(&self, nodes: &[NodeId]) -> SourceRange {
        nodes
            .iter()
            .map(|&n| self.range(n))
            .filter(|r| r.length > 0)
            .reduce(|a, b| a.cover(b))
            .unwrap_or_default()
    }

    /// Span of the `nth` occurrence of `token`.
    pub fn token(&mut self, token: &str, nth: usize) -> SourceRange {
        match locate(&self.source, token, nth) {
            Some(offset) => SourceRange::new(offset, token.len()),
            None => {
                if self.missing.is_none() {
                    self.missing = Some((token.to_string(), nth));
                }
                SourceRange::new(self.source.len(), 0)
            }
        }
    }

    /// Finish with the given top-level members.
    ///
    /// The root spans the whole source and is added last.
    pub fn finish(mut self, members: Vec<NodeId>) -> Result<Unit, AstError> {
        if let Some((token, nth)) = self.missing.take() {
            return Err(AstError::TokenNotFound {
                unit: self.handle,
                token,
                nth,
            });
        }
        let range = SourceRange::new(0, self.source.len());
        let root = self.push(
            NodeKind::CompilationUnit(CompilationUnit { members }),
            range,
        );
        Unit::from_nodes(self.handle, self.nodes, root)
    }

    // ------------------------------------------------------------------------
    // Names and types
    // ------------------------------------------------------------------------

    /// Identifier at the `nth` occurrence of `name`.
    pub fn ident(&mut self, name: &str, nth: usize) -> NodeId {
        let range = self.token(name, nth);
        self.ident_at(name, range.offset)
    }

    /// Identifier at an explicit offset.
    pub fn ident_at(&mut self, name: &str, offset: usize) -> NodeId {
        self.push(
            NodeKind::Identifier(Identifier {
                name: name.to_string(),
            }),
            SourceRange::new(offset, name.len()),
        )
    }

    /// Type reference `name` at its `nth` occurrence.
    pub fn type_node(&mut self, name: &str, nth: usize) -> NodeId {
        let identifier = self.ident(name, nth);
        let range = self.range(identifier);
        self.push(
            NodeKind::TypeNode(TypeNode {
                identifier,
                type_arguments: vec![],
            }),
            range,
        )
    }

    /// Parameterized type of a `default` clause.
    pub fn parameterized_type(&mut self, name: &str, nth: usize) -> NodeId {
        let name = self.ident(name, nth);
        let range = self.range(name);
        self.push(
            NodeKind::ParameterizedType(ParameterizedType {
                name,
                type_arguments: vec![],
            }),
            range,
        )
    }

    pub fn literal(&mut self, text: &str, nth: usize) -> NodeId {
        let range = self.token(text, nth);
        self.push(
            NodeKind::Literal(Literal {
                value: text.to_string(),
            }),
            range,
        )
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// `class`/`interface` declaration; the span runs from the name through
    /// the last child.
    pub fn class(
        &mut self,
        name: &str,
        nth: usize,
        is_interface: bool,
        supertypes: Vec<NodeId>,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.class_with_default(name, nth, is_interface, supertypes, None, members)
    }

    pub fn class_with_default(
        &mut self,
        name: &str,
        nth: usize,
        is_interface: bool,
        supertypes: Vec<NodeId>,
        default_class: Option<NodeId>,
        members: Vec<NodeId>,
    ) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered = vec![name];
        covered.extend(&supertypes);
        covered.extend(default_class);
        covered.extend(&members);
        let range = self.cover(&covered);
        self.push(
            NodeKind::Class(Class {
                name,
                is_interface,
                supertypes,
                default_class,
                members,
            }),
            range,
        )
    }

    /// Field group with an optional type annotation.
    pub fn field_group(&mut self, type_node: Option<NodeId>, fields: Vec<NodeId>) -> NodeId {
        let mut covered: Vec<NodeId> = type_node.into_iter().collect();
        covered.extend(&fields);
        let range = self.cover(&covered);
        self.push(
            NodeKind::FieldDefinition(FieldDefinition { type_node, fields }),
            range,
        )
    }

    pub fn field(&mut self, name: &str, nth: usize, value: Option<NodeId>) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered = vec![name];
        covered.extend(value);
        let range = self.cover(&covered);
        self.push(
            NodeKind::Field(Field {
                name,
                accessor: None,
                value,
            }),
            range,
        )
    }

    /// Field with an explicit getter or setter method.
    pub fn field_with_accessor(&mut self, name: &str, nth: usize, accessor: NodeId) -> NodeId {
        let name = self.ident(name, nth);
        let range = self.cover(&[name, accessor]);
        self.push(
            NodeKind::Field(Field {
                name,
                accessor: Some(accessor),
                value: None,
            }),
            range,
        )
    }

    /// Function parameters and body.
    pub fn function(&mut self, parameters: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        let mut covered = parameters.clone();
        covered.extend(body);
        let range = self.cover(&covered);
        self.push(NodeKind::Function(Function { parameters, body }), range)
    }

    /// Method (or top-level function) named `name`.
    pub fn method(
        &mut self,
        name: &str,
        nth: usize,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let name = self.ident(name, nth);
        self.method_named(name, parameters, body)
    }

    /// Method whose name node is already built (e.g. a property access for
    /// a named constructor).
    pub fn method_named(
        &mut self,
        name: NodeId,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let function = self.function(parameters, body);
        let function_range = self.range(function);
        if function_range.length == 0 {
            let name_range = self.range(name);
            if let Some(n) = self.nodes.get_mut(function.index()) {
                n.range = SourceRange::new(name_range.end(), 0);
            }
        }
        let range = self.cover(&[name, function]);
        self.push(
            NodeKind::MethodDefinition(MethodDefinition { name, function }),
            range,
        )
    }

    /// Function literal; `name` is `Some((name, nth))` for a named local
    /// function. `anchor` is the token the span starts at (e.g. `(`), used
    /// when the literal has no name.
    pub fn function_expression(
        &mut self,
        name: Option<(&str, usize)>,
        anchor: (&str, usize),
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let name = name.map(|(name, nth)| self.ident(name, nth));
        let mut range = self.token(anchor.0, anchor.1);
        let function = self.function(parameters, body);
        let mut covered = vec![function];
        covered.extend(name);
        let inner = self.cover(&covered);
        if inner.length > 0 {
            range = range.cover(inner);
        }
        if let Some(n) = self.nodes.get_mut(function.index()) {
            n.range = range;
        }
        self.push(
            NodeKind::FunctionExpression(FunctionExpression { name, function }),
            range,
        )
    }

    pub fn function_type_alias(&mut self, name: &str, nth: usize, parameters: Vec<NodeId>) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered = vec![name];
        covered.extend(&parameters);
        let range = self.cover(&covered);
        self.push(
            NodeKind::FunctionTypeAlias(FunctionTypeAlias { name, parameters }),
            range,
        )
    }

    pub fn parameter(&mut self, name: &str, nth: usize, type_node: Option<NodeId>) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered: Vec<NodeId> = type_node.into_iter().collect();
        covered.push(name);
        let range = self.cover(&covered);
        self.push(NodeKind::Parameter(Parameter { name, type_node }), range)
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        let range = self.cover(&statements);
        self.push(NodeKind::Block(Block { statements }), range)
    }

    pub fn expr_stmt(&mut self, expression: NodeId) -> NodeId {
        let range = self.range(expression);
        self.push(
            NodeKind::ExpressionStatement(ExpressionStatement { expression }),
            range,
        )
    }

    pub fn return_stmt(&mut self, value: Option<NodeId>) -> NodeId {
        let range = value.map(|v| self.range(v)).unwrap_or_default();
        self.push(NodeKind::ReturnStatement(ReturnStatement { value }), range)
    }

    pub fn var_stmt(&mut self, type_node: Option<NodeId>, variables: Vec<NodeId>) -> NodeId {
        let mut covered: Vec<NodeId> = type_node.into_iter().collect();
        covered.extend(&variables);
        let range = self.cover(&covered);
        self.push(
            NodeKind::VariableStatement(VariableStatement {
                type_node,
                variables,
            }),
            range,
        )
    }

    pub fn variable(&mut self, name: &str, nth: usize, value: Option<NodeId>) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered = vec![name];
        covered.extend(value);
        let range = self.cover(&covered);
        self.push(NodeKind::Variable(Variable { name, value }), range)
    }

    pub fn label(&mut self, name: &str, nth: usize, statement: NodeId) -> NodeId {
        let label = self.ident(name, nth);
        let range = self.cover(&[label, statement]);
        self.push(NodeKind::Label(Label { label, statement }), range)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// `qualifier.name`, with `name` at its `nth` occurrence.
    pub fn property_access(&mut self, qualifier: Option<NodeId>, name: &str, nth: usize) -> NodeId {
        let name = self.ident(name, nth);
        let mut covered: Vec<NodeId> = qualifier.into_iter().collect();
        covered.push(name);
        let range = self.cover(&covered);
        self.push(
            NodeKind::PropertyAccess(PropertyAccess { qualifier, name }),
            range,
        )
    }

    /// `target.name(arguments)`.
    pub fn method_call(
        &mut self,
        target: Option<NodeId>,
        name: &str,
        nth: usize,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        let function_name = self.ident(name, nth);
        let mut covered: Vec<NodeId> = target.into_iter().collect();
        covered.push(function_name);
        covered.extend(&arguments);
        let range = self.cover(&covered);
        self.push(
            NodeKind::MethodInvocation(MethodInvocation {
                target,
                function_name,
                arguments,
            }),
            range,
        )
    }

    /// `name(arguments)`.
    pub fn call(&mut self, name: &str, nth: usize, arguments: Vec<NodeId>) -> NodeId {
        let target = self.ident(name, nth);
        let mut covered = vec![target];
        covered.extend(&arguments);
        let range = self.cover(&covered);
        self.push(
            NodeKind::UnqualifiedInvocation(UnqualifiedInvocation { target, arguments }),
            range,
        )
    }

    pub fn function_object_call(&mut self, target: NodeId, arguments: Vec<NodeId>) -> NodeId {
        let mut covered = vec![target];
        covered.extend(&arguments);
        let range = self.cover(&covered);
        self.push(
            NodeKind::FunctionObjectInvocation(FunctionObjectInvocation { target, arguments }),
            range,
        )
    }

    /// `new constructor(arguments)`; the span starts at the `nth` `new`.
    pub fn new_expr(&mut self, nth: usize, constructor: NodeId, arguments: Vec<NodeId>) -> NodeId {
        let keyword = self.token("new", nth);
        let mut covered = vec![constructor];
        covered.extend(&arguments);
        let range = keyword.cover(self.cover(&covered));
        self.push(
            NodeKind::NewExpression(NewExpression {
                constructor,
                arguments,
            }),
            range,
        )
    }

    /// `super(arguments)` / `super.name(arguments)`; the span starts at the
    /// `nth` `super`.
    pub fn super_call(&mut self, nth: usize, name: Option<NodeId>, arguments: Vec<NodeId>) -> NodeId {
        let range = self.keyword_span("super", nth, name, &arguments);
        self.push(
            NodeKind::SuperConstructorInvocation(SuperConstructorInvocation { name, arguments }),
            range,
        )
    }

    /// `this(arguments)` / `this.name(arguments)`; the span starts at the
    /// `nth` `this`.
    pub fn redirect_call(
        &mut self,
        nth: usize,
        name: Option<NodeId>,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        let range = self.keyword_span("this", nth, name, &arguments);
        self.push(
            NodeKind::RedirectConstructorInvocation(RedirectConstructorInvocation {
                name,
                arguments,
            }),
            range,
        )
    }

    pub fn binary(&mut self, operator: Operator, left: NodeId, right: NodeId) -> NodeId {
        let range = self.cover(&[left, right]);
        self.push(
            NodeKind::BinaryExpression(BinaryExpression {
                operator,
                left,
                right,
            }),
            range,
        )
    }

    /// Prefix operator; the span starts at the last occurrence of the
    /// operator token before the operand.
    pub fn prefix(&mut self, operator: Operator, operand: NodeId) -> NodeId {
        let operand_range = self.range(operand);
        let start = self
            .source
            .get(..operand_range.offset)
            .and_then(|before| before.rfind(operator.syntax()))
            .unwrap_or(operand_range.offset);
        self.unary(operator, operand, true, SourceRange::between(start, operand_range.end()))
    }

    /// Postfix operator; the span ends after the first occurrence of the
    /// operator token following the operand.
    pub fn postfix(&mut self, operator: Operator, operand: NodeId) -> NodeId {
        let operand_range = self.range(operand);
        let end = self
            .source
            .get(operand_range.end()..)
            .and_then(|rest| rest.find(operator.syntax()))
            .map(|pos| operand_range.end() + pos + operator.syntax().len())
            .unwrap_or(operand_range.end());
        self.unary(operator, operand, false, SourceRange::between(operand_range.offset, end))
    }

    /// Unary expression with an explicit span.
    pub fn unary(
        &mut self,
        operator: Operator,
        operand: NodeId,
        prefix: bool,
        range: SourceRange,
    ) -> NodeId {
        self.push(
            NodeKind::UnaryExpression(UnaryExpression {
                operator,
                operand,
                prefix,
            }),
            range,
        )
    }

    /// `target[key]`; the span ends after the first `]` following the key.
    pub fn index(&mut self, target: NodeId, key: NodeId) -> NodeId {
        let key_range = self.range(key);
        let target_range = self.range(target);
        let end = self
            .source
            .get(key_range.end()..)
            .and_then(|rest| rest.find(']'))
            .map(|pos| key_range.end() + pos + 1)
            .unwrap_or(key_range.end());
        self.push(
            NodeKind::ArrayAccess(ArrayAccess { target, key }),
            SourceRange::between(target_range.offset, end),
        )
    }

    fn keyword_span(
        &mut self,
        keyword: &str,
        nth: usize,
        name: Option<NodeId>,
        arguments: &[NodeId],
    ) -> SourceRange {
        let range = self.token(keyword, nth);
        let mut covered: Vec<NodeId> = name.into_iter().collect();
        covered.extend(arguments);
        let inner = self.cover(&covered);
        if inner.length > 0 {
            range.cover(inner)
        } else {
            range
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod locate_tests {
        use super::*;

        #[test]
        fn skips_matches_inside_identifiers() {
            let source = "class A { a() {} }";
            assert_eq!(locate(source, "a", 0), Some(10));
            assert_eq!(locate(source, "A", 0), Some(6));
            assert_eq!(locate(source, "a", 1), None);
        }

        #[test]
        fn operators_match_anywhere() {
            assert_eq!(locate("a+b+c", "+", 1), Some(3));
            assert_eq!(locate("a+b", "", 0), None);
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn spans_come_from_source() {
            let source = "class A { int x; m() { x = 1; } }";
            let mut b = UnitBuilder::new("a.dart", source);
            let int = b.type_node("int", 0);
            let x = b.field("x", 0, None);
            let group = b.field_group(Some(int), vec![x]);
            let lhs = b.ident("x", 1);
            let one = b.literal("1", 0);
            let assign = b.binary(Operator::Assign, lhs, one);
            let stmt = b.expr_stmt(assign);
            let body = b.block(vec![stmt]);
            let m = b.method("m", 0, vec![], Some(body));
            let a = b.class("A", 0, false, vec![], vec![group, m]);
            let unit = b.finish(vec![a]).unwrap();

            let lhs = unit.get(lhs).unwrap();
            assert_eq!(lhs.range(), SourceRange::new(23, 1));
            assert_eq!(unit.get(assign).unwrap().range(), SourceRange::new(23, 5));
            assert_eq!(lhs.ancestors().count(), 7);
        }

        #[test]
        fn missing_token_fails_finish() {
            let mut b = UnitBuilder::new("a.dart", "class A {}");
            let a = b.class("B", 0, false, vec![], vec![]);
            let err = b.finish(vec![a]).unwrap_err();
            assert_eq!(
                err,
                AstError::TokenNotFound {
                    unit: UnitHandle::new("a.dart"),
                    token: "B".to_string(),
                    nth: 0,
                }
            );
        }

        #[test]
        fn unary_and_index_spans_include_tokens() {
            let source = "-a; b[i]; c++;";
            let mut b = UnitBuilder::new("a.dart", source);
            let a = b.ident("a", 0);
            let neg = b.prefix(Operator::Negate, a);
            let target = b.ident("b", 0);
            let key = b.ident("i", 0);
            let idx = b.index(target, key);
            let c = b.ident("c", 0);
            let inc = b.postfix(Operator::Inc, c);
            assert_eq!(b.range(neg), SourceRange::new(0, 2));
            assert_eq!(b.range(idx), SourceRange::new(4, 4));
            assert_eq!(b.range(inc), SourceRange::new(10, 3));
        }
    }
}
