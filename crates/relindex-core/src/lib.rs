//! Core infrastructure for relindex.
//!
//! This crate provides the language-agnostic half of the indexer:
//! - Index model: resources, elements, locations and relationship kinds
//! - The [`store::IndexStore`] write/query contract and an in-memory store
//! - Collaborator traits for resource lookup and source access
//! - Error types and error codes
//! - Text utilities for offset searches and line:column conversion
//! - JSON output types for CLI responses

pub mod element;
pub mod error;
pub mod location;
pub mod output;
pub mod relationship;
pub mod resource;
pub mod store;
pub mod text;
