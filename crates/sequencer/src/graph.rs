//! Node registry and edge store backing the sequencer.
//!
//! Nodes live in an [`IndexMap`] keyed by [`NodeKey`]; the map's dense insertion index doubles as
//! the node handle and as its discovery sequence number, so neither can change once assigned.
//! Outgoing references are kept per node as an [`IndexSet`] of handles, which gives set semantics
//! while preserving the order references were first recorded.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};
use unimigrate_types::NodeKey;

use crate::error::SequencerError;

/// Handle to a node in a [`MigrationGraph`]. Also the node's zero-based discovery sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
    /// Zero-based position in discovery order.
    pub fn discovery_sequence(self) -> usize {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Attributes stored for a node. Identity lives in the registry key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: Option<String>,
}

impl Node {
    /// Display name, or `None` while the node is still a placeholder.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.name.is_none()
    }
}

/// In-memory reference graph for one planning session.
#[derive(Debug, Default)]
pub struct MigrationGraph {
    nodes: IndexMap<NodeKey, Node>,
    outgoing: Vec<IndexSet<usize>>,
}

impl MigrationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `key`, creating it when absent.
    ///
    /// A supplied name fills in a placeholder or replaces a previous name. Blank names are treated
    /// as absent. Callers are responsible for validating `key`.
    pub fn ensure_node(&mut self, key: NodeKey, name: Option<&str>) -> NodeRef {
        let name = name.filter(|value| !value.trim().is_empty());
        let entry = self.nodes.entry(key);
        let index = entry.index();
        match entry {
            indexmap::map::Entry::Occupied(mut occupied) => {
                if let Some(name) = name {
                    let previous = occupied.get().name.clone();
                    match previous.as_deref() {
                        Some(existing) if existing == name => {}
                        Some(existing) => {
                            warn!(node = %occupied.key(), previous = existing, current = name, "Replacing display name of migration node");
                            occupied.get_mut().name = Some(name.to_string());
                        }
                        None => occupied.get_mut().name = Some(name.to_string()),
                    }
                }
            }
            indexmap::map::Entry::Vacant(vacant) => {
                debug!(node = %vacant.key(), sequence = index, placeholder = name.is_none(), "Discovered migration node");
                vacant.insert(Node {
                    name: name.map(str::to_string),
                });
                self.outgoing.push(IndexSet::new());
            }
        }
        NodeRef(index)
    }

    /// Record that `from` references `to`. Returns `false` when the edge already existed.
    ///
    /// Fails when either handle does not belong to this graph.
    pub fn add_reference(&mut self, from: NodeRef, to: NodeRef) -> Result<bool, SequencerError> {
        if to.0 >= self.nodes.len() {
            return Err(SequencerError::unknown_node(to));
        }
        let targets = self.outgoing.get_mut(from.0).ok_or_else(|| SequencerError::unknown_node(from))?;
        Ok(targets.insert(to.0))
    }

    /// Targets referenced by `node`, in the order the references were first recorded.
    /// Empty for handles that do not belong to this graph.
    pub fn outgoing(&self, node: NodeRef) -> impl DoubleEndedIterator<Item = NodeRef> + '_ {
        self.outgoing.get(node.0).into_iter().flatten().map(|&index| NodeRef(index))
    }

    pub fn lookup(&self, key: &NodeKey) -> Option<NodeRef> {
        self.nodes.get_index_of(key).map(NodeRef)
    }

    pub fn get(&self, node: NodeRef) -> Option<(&NodeKey, &Node)> {
        self.nodes.get_index(node.0)
    }

    /// All nodes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &NodeKey, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(index, (key, node))| (NodeRef(index), key, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(IndexSet::len).sum()
    }
}
