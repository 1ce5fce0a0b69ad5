//! The sequencer value that owns one planning session's graph.

use unimigrate_types::{MigrationManifest, MigrationStep, NodeKey};

use crate::error::SequencerError;
use crate::graph::{MigrationGraph, Node, NodeRef};
use crate::linearize::{Linearizer, generate_steps};

/// Accumulates registration facts for one migration run and orders them into steps.
///
/// Create one instance per run and hand it to every collaborator that registers facts. The
/// sequencer does no locking; concurrent registration needs external synchronization.
#[derive(Debug, Default)]
pub struct MigrationSequencer {
    pub(crate) graph: MigrationGraph,
    linearizer: Linearizer,
}

impl MigrationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequencer and apply every registration of `manifest` in order.
    pub fn from_manifest(manifest: &MigrationManifest) -> Result<Self, SequencerError> {
        let mut sequencer = Self::new();
        sequencer.register_all(manifest.registrations.iter())?;
        Ok(sequencer)
    }

    /// Return the node for `key`, creating it (as a placeholder when `name` is `None`) if absent.
    pub fn ensure_node(&mut self, key: NodeKey, name: Option<&str>) -> Result<NodeRef, SequencerError> {
        key.validate()?;
        Ok(self.graph.ensure_node(key, name))
    }

    /// Record that `from` references the object identified by `to`, materializing `to` as a
    /// placeholder when it has not been registered yet.
    ///
    /// Fails without touching the graph when `from` was not issued by this sequencer.
    pub fn add_reference(&mut self, from: NodeRef, to: NodeKey) -> Result<NodeRef, SequencerError> {
        if self.graph.get(from).is_none() {
            return Err(SequencerError::unknown_node(from));
        }
        let target = self.ensure_node(to, None)?;
        self.graph.add_reference(from, target)?;
        Ok(target)
    }

    /// Targets referenced by `node`, in the order the references were recorded.
    pub fn outgoing(&self, node: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        self.graph.outgoing(node)
    }

    pub fn lookup(&self, key: &NodeKey) -> Option<NodeRef> {
        self.graph.lookup(key)
    }

    pub fn node(&self, node: NodeRef) -> Option<(&NodeKey, &Node)> {
        self.graph.get(node)
    }

    pub fn graph(&self) -> &MigrationGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Order every known object into migration steps.
    ///
    /// Can be called repeatedly. Every call walks the whole graph again; objects numbered by an
    /// earlier call keep their step numbers, and objects registered since then are appended with
    /// continuing numbers at the point the walk first reaches them.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::StepLimitExceeded`] when the plan would need more than `u32::MAX` steps.
    pub fn generate_steps(&mut self) -> Result<Vec<MigrationStep>, SequencerError> {
        generate_steps(&mut self.linearizer, &self.graph)
    }
}
