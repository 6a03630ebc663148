//! relindex: source-code relationship indexer
//!
//! Walks resolved compilation units and records typed relationships
//! (definitions, type hierarchy, overrides, references, accesses and
//! invocations) between program elements and source locations.

// Core infrastructure - re-exported from relindex-core
pub use relindex_core::element;
pub use relindex_core::error;
pub use relindex_core::location;
pub use relindex_core::output;
pub use relindex_core::relationship;
pub use relindex_core::resource;
pub use relindex_core::store;
pub use relindex_core::text;

// The resolved AST and the contributor
pub use relindex_ast as ast;
pub use relindex_contributor as contributor;

// Front door
pub mod cli;
pub mod snapshot;
