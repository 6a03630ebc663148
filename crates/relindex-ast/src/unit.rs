//! Unit arenas and node handles.

use relindex_core::resource::UnitHandle;

use crate::binding::BindingId;
use crate::error::AstError;
use crate::nodes::{Node, NodeId, NodeKind, SourceRange};

// ============================================================================
// Unit
// ============================================================================

/// A parsed and bound compilation unit.
///
/// Constructed through [`Unit::from_nodes`], which validates that the arena
/// is a tree rooted at a [`NodeKind::CompilationUnit`] and computes parent
/// links. Nodes not reachable from the root are kept but never visited.
#[derive(Debug, Clone)]
pub struct Unit {
    handle: UnitHandle,
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
}

impl Unit {
    /// Assemble a unit from an arena.
    pub fn from_nodes(handle: UnitHandle, nodes: Vec<Node>, root: NodeId) -> Result<Unit, AstError> {
        match nodes.get(root.index()).map(|n| &n.kind) {
            Some(NodeKind::CompilationUnit(_)) => {}
            _ => {
                return Err(AstError::InvalidRoot {
                    unit: handle,
                    root,
                })
            }
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            let parent = NodeId(index as u32);
            for child in node.kind.children() {
                let Some(slot) = parents.get_mut(child.index()) else {
                    return Err(AstError::DanglingChild {
                        unit: handle,
                        parent,
                        child,
                    });
                };
                if child == root {
                    return Err(AstError::RootHasParent { unit: handle, root });
                }
                if slot.is_some() {
                    return Err(AstError::MultipleParents {
                        unit: handle,
                        node: child,
                    });
                }
                *slot = Some(parent);
            }
        }

        Ok(Unit {
            handle,
            nodes,
            parents,
            root,
        })
    }

    pub fn handle(&self) -> &UnitHandle {
        &self.handle
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Handle on the root node.
    pub fn root_ref(&self) -> NodeRef<'_> {
        NodeRef {
            unit: self,
            id: self.root,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Handle on a node, if the id is in range.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node(id).map(|_| NodeRef { unit: self, id })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }
}

// ============================================================================
// NodeRef
// ============================================================================

/// A node together with the unit that owns it.
///
/// `NodeRef` is `Copy` and always points at an existing node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    unit: &'a Unit,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn unit(&self) -> &'a Unit {
        self.unit
    }

    pub fn node(&self) -> &'a Node {
        // Construction guarantees the id is in range.
        &self.unit.nodes[self.id.index()]
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node().kind
    }

    pub fn range(&self) -> SourceRange {
        self.node().range
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.node().binding
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.unit.parent(self.id).map(|id| NodeRef {
            unit: self.unit,
            id,
        })
    }

    /// Handle on another node of the same unit.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.unit.get(id)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Name of an identifier node.
    pub fn identifier_name(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Identifier(ident) => Some(ident.name.as_str()),
            _ => None,
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.unit, other.unit) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}
