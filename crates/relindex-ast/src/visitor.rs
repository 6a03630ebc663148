//! Visitor trait and walk functions for unit traversal.
//!
//! - **Pre-order**: `visit_*` is called before descending into children
//! - **Post-order**: `leave_*` is called after all children have been visited
//! - **Source order**: children are visited in the order of
//!   [`NodeKind::children`]
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)

use crate::nodes::{
    ArrayAccess, BinaryExpression, Block, Class, CompilationUnit, ExpressionStatement, Field,
    FieldDefinition, Function, FunctionExpression, FunctionObjectInvocation, FunctionTypeAlias,
    Identifier, Label, Literal, MethodDefinition, MethodInvocation, NewExpression, NodeKind,
    Parameter, ParameterizedType, PropertyAccess, RedirectConstructorInvocation, ReturnStatement,
    SuperConstructorInvocation, TypeNode, UnaryExpression, UnqualifiedInvocation, Variable,
    VariableStatement,
};
use crate::unit::{NodeRef, Unit};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,
    /// Skip children; `leave_*` is still called for this node.
    SkipChildren,
    /// Stop traversal entirely.
    Stop,
}

/// Generates `visit_*`/`leave_*` pairs with default implementations.
macro_rules! visitor_methods {
    (
        $lt:lifetime;
        $(
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: NodeRef<$lt>, kind: &$lt $node_type) -> VisitResult {
                    VisitResult::Continue
                }

                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: NodeRef<$lt>, kind: &$lt $node_type) {}
            )*
        }
    };
}

/// Read-only visitor over a [`Unit`].
///
/// Each node kind has a `visit_*` and `leave_*` method; every method
/// receives the node handle (for span, binding and parent lookups) and the
/// typed kind payload. Unimplemented methods continue into children.
pub trait Visitor<'a> {
    visitor_methods! {
        'a;
        compilation_unit: CompilationUnit,
        class: Class,
        field_definition: FieldDefinition,
        field: Field,
        method_definition: MethodDefinition,
        function: Function,
        function_expression: FunctionExpression,
        function_type_alias: FunctionTypeAlias,
        parameter: Parameter,
        type_node: TypeNode,
        parameterized_type: ParameterizedType,
        block: Block,
        expression_statement: ExpressionStatement,
        return_statement: ReturnStatement,
        variable_statement: VariableStatement,
        variable: Variable,
        label: Label,
        identifier: Identifier,
        property_access: PropertyAccess,
        method_invocation: MethodInvocation,
        unqualified_invocation: UnqualifiedInvocation,
        function_object_invocation: FunctionObjectInvocation,
        new_expression: NewExpression,
        redirect_constructor_invocation: RedirectConstructorInvocation,
        super_constructor_invocation: SuperConstructorInvocation,
        binary_expression: BinaryExpression,
        unary_expression: UnaryExpression,
        array_access: ArrayAccess,
        literal: Literal,
    }
}

// ============================================================================
// Walk functions
// ============================================================================

/// Walk a whole unit from its root.
pub fn walk_unit<'a, V: Visitor<'a>>(visitor: &mut V, unit: &'a Unit) -> VisitResult {
    walk_node(visitor, unit.root_ref())
}

/// Walk a node and its subtree.
///
/// Traversal order:
/// 1. `visit_*` for the node's kind
/// 2. Walk each child (unless skipped or stopped)
/// 3. `leave_*` for the node's kind
pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeRef<'a>) -> VisitResult {
    let kind = node.kind();
    let result = match kind {
        NodeKind::CompilationUnit(k) => visitor.visit_compilation_unit(node, k),
        NodeKind::Class(k) => visitor.visit_class(node, k),
        NodeKind::FieldDefinition(k) => visitor.visit_field_definition(node, k),
        NodeKind::Field(k) => visitor.visit_field(node, k),
        NodeKind::MethodDefinition(k) => visitor.visit_method_definition(node, k),
        NodeKind::Function(k) => visitor.visit_function(node, k),
        NodeKind::FunctionExpression(k) => visitor.visit_function_expression(node, k),
        NodeKind::FunctionTypeAlias(k) => visitor.visit_function_type_alias(node, k),
        NodeKind::Parameter(k) => visitor.visit_parameter(node, k),
        NodeKind::TypeNode(k) => visitor.visit_type_node(node, k),
        NodeKind::ParameterizedType(k) => visitor.visit_parameterized_type(node, k),
        NodeKind::Block(k) => visitor.visit_block(node, k),
        NodeKind::ExpressionStatement(k) => visitor.visit_expression_statement(node, k),
        NodeKind::ReturnStatement(k) => visitor.visit_return_statement(node, k),
        NodeKind::VariableStatement(k) => visitor.visit_variable_statement(node, k),
        NodeKind::Variable(k) => visitor.visit_variable(node, k),
        NodeKind::Label(k) => visitor.visit_label(node, k),
        NodeKind::Identifier(k) => visitor.visit_identifier(node, k),
        NodeKind::PropertyAccess(k) => visitor.visit_property_access(node, k),
        NodeKind::MethodInvocation(k) => visitor.visit_method_invocation(node, k),
        NodeKind::UnqualifiedInvocation(k) => visitor.visit_unqualified_invocation(node, k),
        NodeKind::FunctionObjectInvocation(k) => visitor.visit_function_object_invocation(node, k),
        NodeKind::NewExpression(k) => visitor.visit_new_expression(node, k),
        NodeKind::RedirectConstructorInvocation(k) => {
            visitor.visit_redirect_constructor_invocation(node, k)
        }
        NodeKind::SuperConstructorInvocation(k) => {
            visitor.visit_super_constructor_invocation(node, k)
        }
        NodeKind::BinaryExpression(k) => visitor.visit_binary_expression(node, k),
        NodeKind::UnaryExpression(k) => visitor.visit_unary_expression(node, k),
        NodeKind::ArrayAccess(k) => visitor.visit_array_access(node, k),
        NodeKind::Literal(k) => visitor.visit_literal(node, k),
    };

    match result {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for child in kind.children() {
                let Some(child) = node.get(child) else {
                    continue;
                };
                if walk_node(visitor, child) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }
    }

    match kind {
        NodeKind::CompilationUnit(k) => visitor.leave_compilation_unit(node, k),
        NodeKind::Class(k) => visitor.leave_class(node, k),
        NodeKind::FieldDefinition(k) => visitor.leave_field_definition(node, k),
        NodeKind::Field(k) => visitor.leave_field(node, k),
        NodeKind::MethodDefinition(k) => visitor.leave_method_definition(node, k),
        NodeKind::Function(k) => visitor.leave_function(node, k),
        NodeKind::FunctionExpression(k) => visitor.leave_function_expression(node, k),
        NodeKind::FunctionTypeAlias(k) => visitor.leave_function_type_alias(node, k),
        NodeKind::Parameter(k) => visitor.leave_parameter(node, k),
        NodeKind::TypeNode(k) => visitor.leave_type_node(node, k),
        NodeKind::ParameterizedType(k) => visitor.leave_parameterized_type(node, k),
        NodeKind::Block(k) => visitor.leave_block(node, k),
        NodeKind::ExpressionStatement(k) => visitor.leave_expression_statement(node, k),
        NodeKind::ReturnStatement(k) => visitor.leave_return_statement(node, k),
        NodeKind::VariableStatement(k) => visitor.leave_variable_statement(node, k),
        NodeKind::Variable(k) => visitor.leave_variable(node, k),
        NodeKind::Label(k) => visitor.leave_label(node, k),
        NodeKind::Identifier(k) => visitor.leave_identifier(node, k),
        NodeKind::PropertyAccess(k) => visitor.leave_property_access(node, k),
        NodeKind::MethodInvocation(k) => visitor.leave_method_invocation(node, k),
        NodeKind::UnqualifiedInvocation(k) => visitor.leave_unqualified_invocation(node, k),
        NodeKind::FunctionObjectInvocation(k) => visitor.leave_function_object_invocation(node, k),
        NodeKind::NewExpression(k) => visitor.leave_new_expression(node, k),
        NodeKind::RedirectConstructorInvocation(k) => {
            visitor.leave_redirect_constructor_invocation(node, k)
        }
        NodeKind::SuperConstructorInvocation(k) => {
            visitor.leave_super_constructor_invocation(node, k)
        }
        NodeKind::BinaryExpression(k) => visitor.leave_binary_expression(node, k),
        NodeKind::UnaryExpression(k) => visitor.leave_unary_expression(node, k),
        NodeKind::ArrayAccess(k) => visitor.leave_array_access(node, k),
        NodeKind::Literal(k) => visitor.leave_literal(node, k),
    }
    VisitResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::UnitBuilder;

    /// Records visit/leave events as strings.
    #[derive(Default)]
    struct EventLog {
        events: Vec<String>,
        skip_classes: bool,
        stop_at: Option<&'static str>,
    }

    impl<'a> Visitor<'a> for EventLog {
        fn visit_class(&mut self, _node: NodeRef<'a>, _kind: &'a Class) -> VisitResult {
            self.events.push("visit class".to_string());
            if self.skip_classes {
                VisitResult::SkipChildren
            } else {
                VisitResult::Continue
            }
        }

        fn leave_class(&mut self, _node: NodeRef<'a>, _kind: &'a Class) {
            self.events.push("leave class".to_string());
        }

        fn visit_identifier(&mut self, _node: NodeRef<'a>, kind: &'a Identifier) -> VisitResult {
            self.events.push(format!("ident {}", kind.name));
            if self.stop_at == Some(kind.name.as_str()) {
                return VisitResult::Stop;
            }
            VisitResult::Continue
        }
    }

    fn two_classes() -> Unit {
        let mut b = UnitBuilder::new("a.dart", "class A {} class B {}");
        let a = b.class("A", 0, false, vec![], vec![]);
        let bb = b.class("B", 0, false, vec![], vec![]);
        b.finish(vec![a, bb]).unwrap()
    }

    #[test]
    fn pre_and_post_order() {
        let unit = two_classes();
        let mut log = EventLog::default();
        assert_eq!(walk_unit(&mut log, &unit), VisitResult::Continue);
        assert_eq!(
            log.events,
            vec![
                "visit class",
                "ident A",
                "leave class",
                "visit class",
                "ident B",
                "leave class"
            ]
        );
    }

    #[test]
    fn skip_children_still_leaves() {
        let unit = two_classes();
        let mut log = EventLog {
            skip_classes: true,
            ..EventLog::default()
        };
        walk_unit(&mut log, &unit);
        assert_eq!(
            log.events,
            vec!["visit class", "leave class", "visit class", "leave class"]
        );
    }

    #[test]
    fn stop_halts_without_leave() {
        let unit = two_classes();
        let mut log = EventLog {
            stop_at: Some("A"),
            ..EventLog::default()
        };
        assert_eq!(walk_unit(&mut log, &unit), VisitResult::Stop);
        assert_eq!(log.events, vec!["visit class", "ident A"]);
    }
}
