//! Workspace snapshots.
//!
//! A snapshot is the JSON hand-off from a front end that has parsed and
//! resolved a set of compilation units:
//!
//! ```json
//! {
//!   "bindings": [ { "name": "A", "kind": "class", "enclosing": 0, "unit": "lib/a.dart" } ],
//!   "units": [
//!     { "handle": "lib/a.dart", "source": "class A {}", "root": 2, "nodes": [ ... ] }
//!   ],
//!   "external_units": [ "lib/core.dart" ]
//! }
//! ```
//!
//! A unit without a `library` owns its own library. Units listed under
//! `external_units` have resources but are not indexed. Sources that are
//! not embedded are read from disk relative to the snapshot file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use relindex_ast::{Node, NodeId, SemanticModel, Unit};
use relindex_core::error::{IndexError, LookupError};
use relindex_core::resource::{Resource, ResourceResolver, SourceProvider, UnitHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Snapshot Format
// ============================================================================

/// Serialized form of a workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub bindings: SemanticModel,
    #[serde(default)]
    pub units: Vec<UnitSnapshot>,
    #[serde(default)]
    pub external_units: Vec<UnitHandle>,
}

/// One parsed and bound compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub handle: UnitHandle,
    /// Unit defining the owning library; the unit itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<UnitHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub root: NodeId,
    pub nodes: Vec<Node>,
}

// ============================================================================
// Workspace
// ============================================================================

#[derive(Debug, Clone)]
struct UnitEntry {
    library: UnitHandle,
    source: Option<String>,
}

/// A loaded snapshot: validated units plus the collaborators the
/// contributor needs.
///
/// Resources are named after unit handles.
#[derive(Debug)]
pub struct Workspace {
    model: SemanticModel,
    units: Vec<Unit>,
    entries: HashMap<UnitHandle, UnitEntry>,
    base_dir: PathBuf,
}

impl Workspace {
    /// Read and validate a snapshot file.
    pub fn load(path: &Path) -> Result<Workspace, IndexError> {
        let text = fs::read_to_string(path)
            .map_err(|e| IndexError::snapshot(path.display().to_string(), e.to_string()))?;
        let snapshot: WorkspaceSnapshot = serde_json::from_str(&text)
            .map_err(|e| IndexError::snapshot(path.display().to_string(), e.to_string()))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Workspace::from_snapshot(snapshot, base_dir)
    }

    /// Validate a snapshot already in memory.
    ///
    /// Fails on a duplicate unit handle or a malformed node arena.
    pub fn from_snapshot(
        snapshot: WorkspaceSnapshot,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Workspace, IndexError> {
        let mut entries = HashMap::new();
        for handle in snapshot.external_units {
            entries.insert(
                handle.clone(),
                UnitEntry {
                    library: handle,
                    source: None,
                },
            );
        }

        let mut units = Vec::with_capacity(snapshot.units.len());
        for unit in snapshot.units {
            let entry = UnitEntry {
                library: unit.library.unwrap_or_else(|| unit.handle.clone()),
                source: unit.source,
            };
            if entries.insert(unit.handle.clone(), entry).is_some() {
                return Err(IndexError::snapshot(
                    unit.handle.to_string(),
                    "unit listed more than once",
                ));
            }
            units.push(Unit::from_nodes(unit.handle, unit.nodes, unit.root)?);
        }

        debug!(
            units = units.len(),
            bindings = snapshot.bindings.len(),
            "loaded workspace snapshot"
        );
        Ok(Workspace {
            model: snapshot.bindings,
            units,
            entries,
            base_dir: base_dir.into(),
        })
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    /// Units to index, in snapshot order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, handle: &UnitHandle) -> Option<&Unit> {
        self.units.iter().find(|u| u.handle() == handle)
    }
}

impl ResourceResolver for Workspace {
    fn resource(&self, unit: &UnitHandle) -> Result<Resource, LookupError> {
        if self.entries.contains_key(unit) {
            Ok(Resource::new(unit.as_str()))
        } else {
            Err(LookupError::ResourceNotFound { unit: unit.clone() })
        }
    }

    fn library_unit(&self, unit: &UnitHandle) -> Result<UnitHandle, LookupError> {
        self.entries
            .get(unit)
            .map(|entry| entry.library.clone())
            .ok_or_else(|| LookupError::LibraryNotFound { unit: unit.clone() })
    }
}

impl SourceProvider for Workspace {
    fn source(&self, unit: &UnitHandle) -> Result<String, LookupError> {
        if let Some(text) = self.entries.get(unit).and_then(|e| e.source.as_ref()) {
            return Ok(text.clone());
        }
        fs::read_to_string(self.base_dir.join(unit.as_str())).map_err(|e| {
            LookupError::SourceUnavailable {
                unit: unit.clone(),
                reason: e.to_string(),
            }
        })
    }
}
