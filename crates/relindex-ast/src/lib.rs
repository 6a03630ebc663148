//! Resolved syntax trees for relindex.
//!
//! The indexer does not parse. It consumes units that a front end has already
//! parsed and bound, expressed here as:
//!
//! - [`Unit`]: an arena of typed [`Node`]s with parent links, one per
//!   compilation unit
//! - [`SemanticModel`]: the bindings attached to nodes (classes, methods,
//!   fields, variables, function type aliases)
//! - [`Visitor`] and [`walk_unit`]: pre-order/post-order traversal with one
//!   `visit_*`/`leave_*` pair per node kind
//! - [`UnitBuilder`]: assembles units by locating tokens in source text
//!
//! Units and bindings are plain serde data so hosts can hand them over as
//! JSON.

pub mod binding;
pub mod builder;
pub mod error;
pub mod nodes;
pub mod unit;
pub mod visitor;

pub use binding::{Binding, BindingId, BindingKind, SemanticModel};
pub use builder::{locate, UnitBuilder};
pub use error::AstError;
pub use nodes::{Node, NodeId, NodeKind, Operator, SourceRange};
pub use unit::{NodeRef, Unit};
pub use visitor::{walk_node, walk_unit, VisitResult, Visitor};
