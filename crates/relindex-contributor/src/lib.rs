//! The relationship contributor.
//!
//! An [`IndexContributor`] walks one resolved [`Unit`](relindex_ast::Unit)
//! and records typed relationships into an
//! [`IndexStore`](relindex_core::store::IndexStore):
//!
//! - definitions (`defines_*`) against the library element, and against the
//!   universe for classes, interfaces and function type aliases
//! - type hierarchy edges (`extends`, `implements` and their inverses)
//! - overrides, found by walking the superclass chain
//! - type references, field accesses and modifications
//! - invocations, including operator call sites recovered from source text
//!
//! Every per-node failure is recoverable: a miss skips one relationship and
//! the walk continues.
//!
//! The building blocks are public so hosts can reuse them:
//! [`scope::ScopeTracker`], [`location::LocationResolver`],
//! [`identity::IdentityResolver`] and [`recorder::RelationshipRecorder`].

pub mod contributor;
pub mod error;
pub mod identity;
pub mod location;
pub mod options;
pub mod recorder;
pub mod scope;

pub use contributor::{contribute, ContributionSummary, IndexContext, IndexContributor};
pub use error::ContributorError;
pub use identity::{BindingLocator, ElementLocator, IdentityResolver};
pub use options::ContributorOptions;
