//! Node types of a resolved compilation unit.
//!
//! Nodes live in a [`Unit`](crate::Unit) arena and refer to each other by
//! [`NodeId`]. Each node kind is a struct holding the ids of its children;
//! [`NodeKind`] is the closed set of kinds.
//!
//! Spans are byte ranges into the unit's source text. The front end keeps a
//! span for every node, but operator tokens have no node of their own: a
//! binary expression only records its operands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binding::BindingId;

// ============================================================================
// Ids and Spans
// ============================================================================

/// Index of a node in its unit's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte span `[offset, offset + length)` in the unit's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub offset: usize,
    pub length: usize,
}

impl SourceRange {
    /// Create a span.
    pub fn new(offset: usize, length: usize) -> Self {
        SourceRange { offset, length }
    }

    /// Span from `start` (inclusive) to `end` (exclusive).
    pub fn between(start: usize, end: usize) -> Self {
        SourceRange::new(start, end.saturating_sub(start))
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: SourceRange) -> SourceRange {
        SourceRange::between(self.offset.min(other.offset), self.end().max(other.end()))
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Operator tokens of binary and unary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignTruncDiv,
    AssignMod,
    AssignBitOr,
    AssignBitXor,
    AssignBitAnd,
    AssignShl,
    AssignShr,
    Eq,
    Ne,
    EqStrict,
    NeStrict,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    TruncDiv,
    Mod,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    And,
    Or,
    Not,
    BitNot,
    /// Unary minus.
    Negate,
    Inc,
    Dec,
    Index,
    IndexAssign,
    Is,
    As,
}

impl Operator {
    /// Source text of the operator token.
    pub fn syntax(&self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::AssignAdd => "+=",
            Operator::AssignSub => "-=",
            Operator::AssignMul => "*=",
            Operator::AssignDiv => "/=",
            Operator::AssignTruncDiv => "~/=",
            Operator::AssignMod => "%=",
            Operator::AssignBitOr => "|=",
            Operator::AssignBitXor => "^=",
            Operator::AssignBitAnd => "&=",
            Operator::AssignShl => "<<=",
            Operator::AssignShr => ">>=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::EqStrict => "===",
            Operator::NeStrict => "!==",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub | Operator::Negate => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::TruncDiv => "~/",
            Operator::Mod => "%",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::Shl => "<<",
            Operator::Shr => ">>",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
            Operator::BitNot => "~",
            Operator::Inc => "++",
            Operator::Dec => "--",
            Operator::Index => "[]",
            Operator::IndexAssign => "[]=",
            Operator::Is => "is",
            Operator::As => "as",
        }
    }

    /// Whether the operator stores into its left operand.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::AssignAdd
                | Operator::AssignSub
                | Operator::AssignMul
                | Operator::AssignDiv
                | Operator::AssignTruncDiv
                | Operator::AssignMod
                | Operator::AssignBitOr
                | Operator::AssignBitXor
                | Operator::AssignBitAnd
                | Operator::AssignShl
                | Operator::AssignShr
        )
    }

    /// Whether a class may declare a method for this operator.
    pub fn is_user_definable(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Lt
                | Operator::Gt
                | Operator::Le
                | Operator::Ge
                | Operator::Sub
                | Operator::Add
                | Operator::Div
                | Operator::TruncDiv
                | Operator::Mul
                | Operator::Mod
                | Operator::BitOr
                | Operator::BitXor
                | Operator::BitAnd
                | Operator::Shl
                | Operator::Shr
                | Operator::Index
                | Operator::IndexAssign
                | Operator::BitNot
                | Operator::Negate
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.syntax())
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Root of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub members: Vec<NodeId>,
}

/// `class` or `interface` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: NodeId,
    #[serde(default)]
    pub is_interface: bool,
    /// Type nodes of the `extends`/`implements` clauses, in source order.
    #[serde(default)]
    pub supertypes: Vec<NodeId>,
    /// `default` clause of an interface.
    #[serde(default)]
    pub default_class: Option<NodeId>,
    #[serde(default)]
    pub members: Vec<NodeId>,
}

/// A group of fields sharing one declaration (`int x, y;`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub type_node: Option<NodeId>,
    pub fields: Vec<NodeId>,
}

/// One field (or top-level variable) of a field group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: NodeId,
    /// Explicit getter or setter body.
    #[serde(default)]
    pub accessor: Option<NodeId>,
    #[serde(default)]
    pub value: Option<NodeId>,
}

/// Method or constructor declaration.
///
/// The name is an identifier, or a property access for named constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: NodeId,
    pub function: NodeId,
}

/// Parameters and body of a method, function or function literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub parameters: Vec<NodeId>,
    #[serde(default)]
    pub body: Option<NodeId>,
}

/// Named local function or anonymous function literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionExpression {
    #[serde(default)]
    pub name: Option<NodeId>,
    pub function: NodeId,
}

/// `typedef` of a function type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTypeAlias {
    pub name: NodeId,
    #[serde(default)]
    pub parameters: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: NodeId,
    #[serde(default)]
    pub type_node: Option<NodeId>,
}

/// Reference to a type. The node's binding is the referenced class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub identifier: NodeId,
    #[serde(default)]
    pub type_arguments: Vec<NodeId>,
}

/// Type with arguments in a `default` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterizedType {
    pub name: NodeId,
    #[serde(default)]
    pub type_arguments: Vec<NodeId>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub value: Option<NodeId>,
}

/// Local variable declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableStatement {
    #[serde(default)]
    pub type_node: Option<NodeId>,
    pub variables: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: NodeId,
    #[serde(default)]
    pub value: Option<NodeId>,
}

/// Labeled statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label: NodeId,
    pub statement: NodeId,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

/// `qualifier.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccess {
    #[serde(default)]
    pub qualifier: Option<NodeId>,
    pub name: NodeId,
}

/// `target.name(arguments)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInvocation {
    #[serde(default)]
    pub target: Option<NodeId>,
    pub function_name: NodeId,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

/// `name(arguments)` with no receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnqualifiedInvocation {
    pub target: NodeId,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

/// Call of an arbitrary expression: `(expr)(arguments)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionObjectInvocation {
    pub target: NodeId,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

/// `new C(arguments)`; the constructor is a type node or a property access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpression {
    pub constructor: NodeId,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

/// `this(arguments)` or `this.name(arguments)` in an initializer list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedirectConstructorInvocation {
    #[serde(default)]
    pub name: Option<NodeId>,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

/// `super(arguments)` or `super.name(arguments)` in an initializer list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuperConstructorInvocation {
    #[serde(default)]
    pub name: Option<NodeId>,
    #[serde(default)]
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: Operator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: Operator,
    pub operand: NodeId,
    pub prefix: bool,
}

/// `target[key]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayAccess {
    pub target: NodeId,
    pub key: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
}

// ============================================================================
// NodeKind
// ============================================================================

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    CompilationUnit(CompilationUnit),
    Class(Class),
    FieldDefinition(FieldDefinition),
    Field(Field),
    MethodDefinition(MethodDefinition),
    Function(Function),
    FunctionExpression(FunctionExpression),
    FunctionTypeAlias(FunctionTypeAlias),
    Parameter(Parameter),
    TypeNode(TypeNode),
    ParameterizedType(ParameterizedType),
    Block(Block),
    ExpressionStatement(ExpressionStatement),
    ReturnStatement(ReturnStatement),
    VariableStatement(VariableStatement),
    Variable(Variable),
    Label(Label),
    Identifier(Identifier),
    PropertyAccess(PropertyAccess),
    MethodInvocation(MethodInvocation),
    UnqualifiedInvocation(UnqualifiedInvocation),
    FunctionObjectInvocation(FunctionObjectInvocation),
    NewExpression(NewExpression),
    RedirectConstructorInvocation(RedirectConstructorInvocation),
    SuperConstructorInvocation(SuperConstructorInvocation),
    BinaryExpression(BinaryExpression),
    UnaryExpression(UnaryExpression),
    ArrayAccess(ArrayAccess),
    Literal(Literal),
}

impl NodeKind {
    /// Child ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::CompilationUnit(n) => out.extend(&n.members),
            NodeKind::Class(n) => {
                out.push(n.name);
                out.extend(&n.supertypes);
                out.extend(n.default_class);
                out.extend(&n.members);
            }
            NodeKind::FieldDefinition(n) => {
                out.extend(n.type_node);
                out.extend(&n.fields);
            }
            NodeKind::Field(n) => {
                out.push(n.name);
                out.extend(n.accessor);
                out.extend(n.value);
            }
            NodeKind::MethodDefinition(n) => {
                out.push(n.name);
                out.push(n.function);
            }
            NodeKind::Function(n) => {
                out.extend(&n.parameters);
                out.extend(n.body);
            }
            NodeKind::FunctionExpression(n) => {
                out.extend(n.name);
                out.push(n.function);
            }
            NodeKind::FunctionTypeAlias(n) => {
                out.push(n.name);
                out.extend(&n.parameters);
            }
            NodeKind::Parameter(n) => {
                out.extend(n.type_node);
                out.push(n.name);
            }
            NodeKind::TypeNode(n) => {
                out.push(n.identifier);
                out.extend(&n.type_arguments);
            }
            NodeKind::ParameterizedType(n) => {
                out.push(n.name);
                out.extend(&n.type_arguments);
            }
            NodeKind::Block(n) => out.extend(&n.statements),
            NodeKind::ExpressionStatement(n) => out.push(n.expression),
            NodeKind::ReturnStatement(n) => out.extend(n.value),
            NodeKind::VariableStatement(n) => {
                out.extend(n.type_node);
                out.extend(&n.variables);
            }
            NodeKind::Variable(n) => {
                out.push(n.name);
                out.extend(n.value);
            }
            NodeKind::Label(n) => {
                out.push(n.label);
                out.push(n.statement);
            }
            NodeKind::Identifier(_) | NodeKind::Literal(_) => {}
            NodeKind::PropertyAccess(n) => {
                out.extend(n.qualifier);
                out.push(n.name);
            }
            NodeKind::MethodInvocation(n) => {
                out.extend(n.target);
                out.push(n.function_name);
                out.extend(&n.arguments);
            }
            NodeKind::UnqualifiedInvocation(n) => {
                out.push(n.target);
                out.extend(&n.arguments);
            }
            NodeKind::FunctionObjectInvocation(n) => {
                out.push(n.target);
                out.extend(&n.arguments);
            }
            NodeKind::NewExpression(n) => {
                out.push(n.constructor);
                out.extend(&n.arguments);
            }
            NodeKind::RedirectConstructorInvocation(n) => {
                out.extend(n.name);
                out.extend(&n.arguments);
            }
            NodeKind::SuperConstructorInvocation(n) => {
                out.extend(n.name);
                out.extend(&n.arguments);
            }
            NodeKind::BinaryExpression(n) => {
                out.push(n.left);
                out.push(n.right);
            }
            NodeKind::UnaryExpression(n) => out.push(n.operand),
            NodeKind::ArrayAccess(n) => {
                out.push(n.target);
                out.push(n.key);
            }
        }
        out
    }

    /// The child that names the declaration, for declaration-like kinds.
    ///
    /// Function literal names and statement labels count as declared names.
    pub fn declared_name(&self) -> Option<NodeId> {
        match self {
            NodeKind::Class(n) => Some(n.name),
            NodeKind::FunctionTypeAlias(n) => Some(n.name),
            NodeKind::Field(n) => Some(n.name),
            NodeKind::MethodDefinition(n) => Some(n.name),
            NodeKind::Variable(n) => Some(n.name),
            NodeKind::Parameter(n) => Some(n.name),
            NodeKind::FunctionExpression(n) => n.name,
            NodeKind::Label(n) => Some(n.label),
            _ => None,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block(_)
                | NodeKind::ExpressionStatement(_)
                | NodeKind::ReturnStatement(_)
                | NodeKind::VariableStatement(_)
                | NodeKind::Label(_)
        )
    }

    pub fn is_class_member(&self) -> bool {
        matches!(
            self,
            NodeKind::FieldDefinition(_) | NodeKind::Field(_) | NodeKind::MethodDefinition(_)
        )
    }

    /// Short name of the kind, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit(_) => "compilation unit",
            NodeKind::Class(_) => "class",
            NodeKind::FieldDefinition(_) => "field definition",
            NodeKind::Field(_) => "field",
            NodeKind::MethodDefinition(_) => "method definition",
            NodeKind::Function(_) => "function",
            NodeKind::FunctionExpression(_) => "function expression",
            NodeKind::FunctionTypeAlias(_) => "function type alias",
            NodeKind::Parameter(_) => "parameter",
            NodeKind::TypeNode(_) => "type",
            NodeKind::ParameterizedType(_) => "parameterized type",
            NodeKind::Block(_) => "block",
            NodeKind::ExpressionStatement(_) => "expression statement",
            NodeKind::ReturnStatement(_) => "return statement",
            NodeKind::VariableStatement(_) => "variable statement",
            NodeKind::Variable(_) => "variable",
            NodeKind::Label(_) => "label",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::PropertyAccess(_) => "property access",
            NodeKind::MethodInvocation(_) => "method invocation",
            NodeKind::UnqualifiedInvocation(_) => "unqualified invocation",
            NodeKind::FunctionObjectInvocation(_) => "function invocation",
            NodeKind::NewExpression(_) => "new expression",
            NodeKind::RedirectConstructorInvocation(_) => "redirect constructor invocation",
            NodeKind::SuperConstructorInvocation(_) => "super constructor invocation",
            NodeKind::BinaryExpression(_) => "binary expression",
            NodeKind::UnaryExpression(_) => "unary expression",
            NodeKind::ArrayAccess(_) => "array access",
            NodeKind::Literal(_) => "literal",
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// One entry of a unit arena.
///
/// `binding` is the semantic binding the front end attached, if any: the
/// declared symbol for declarations, the referenced symbol for identifiers
/// and invocations, the resolved class for type nodes, and the operator
/// method for user-definable operator expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub range: SourceRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingId>,
}

impl Node {
    /// Create an unbound node.
    pub fn new(kind: NodeKind, range: SourceRange) -> Self {
        Node {
            kind,
            range,
            binding: None,
        }
    }

    /// Attach a binding.
    pub fn with_binding(mut self, binding: BindingId) -> Self {
        self.binding = Some(binding);
        self
    }
}
