//! Step ordering over the reference graph.
//!
//! Every node is a traversal root candidate in discovery order. From each root the walk follows
//! outgoing references depth-first in the order they were recorded, numbering each node the first
//! time it is reached (pre-order). Each pass is a fresh traversal with its own visited set, which
//! is what keeps reference cycles finite; numbers handed out by earlier passes are reused, and only
//! nodes without one receive the next number. The walk uses an explicit stack so long reference
//! chains cannot exhaust the call stack.

use tracing::info;
use unimigrate_types::MigrationStep;

use crate::error::SequencerError;
use crate::graph::{MigrationGraph, NodeRef};

/// Step assignments that survive across planning passes over one graph.
#[derive(Debug, Default)]
pub(crate) struct Linearizer {
    step_by_node: Vec<Option<u32>>,
    visit_order: Vec<NodeRef>,
}

impl Linearizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Walk `graph` from every root and number the nodes that have no step yet. Returns how many
    /// were added.
    pub(crate) fn advance(&mut self, graph: &MigrationGraph) -> Result<usize, SequencerError> {
        let already_numbered = self.visit_order.len();
        self.step_by_node.resize(graph.len(), None);

        let mut visited = vec![false; graph.len()];
        let mut stack: Vec<NodeRef> = Vec::new();
        for (root, _, _) in graph.iter() {
            if visited[root.index()] {
                continue;
            }
            stack.push(root);
            while let Some(node) = stack.pop() {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                if self.step_by_node[node.index()].is_none() {
                    let step_number = u32::try_from(self.visit_order.len() + 1).map_err(|_| SequencerError::StepLimitExceeded)?;
                    self.visit_order.push(node);
                    self.step_by_node[node.index()] = Some(step_number);
                }
                // Reversed so the first recorded reference is popped first.
                stack.extend(graph.outgoing(node).rev().filter(|target| !visited[target.index()]));
            }
        }
        Ok(self.visit_order.len() - already_numbered)
    }

    pub(crate) fn step_of(&self, node: NodeRef) -> Option<u32> {
        self.step_by_node.get(node.index()).copied().flatten()
    }

    /// Project the numbered nodes into steps ordered by step number.
    pub(crate) fn steps(&self, graph: &MigrationGraph) -> Vec<MigrationStep> {
        self.visit_order
            .iter()
            .zip(1u32..)
            .filter_map(|(&node, step_number)| {
                let (key, attributes) = graph.get(node)?;
                Some(MigrationStep {
                    step_number,
                    object_type: key.kind,
                    object_id: key.id.clone(),
                    object_name: attributes.name().map(str::to_string),
                    referenced_steps: graph.outgoing(node).filter_map(|target| self.step_of(target)).collect(),
                })
            })
            .collect()
    }
}

/// Run a planning pass over `graph` and return the full ordered step list.
pub(crate) fn generate_steps(linearizer: &mut Linearizer, graph: &MigrationGraph) -> Result<Vec<MigrationStep>, SequencerError> {
    let added = linearizer.advance(graph)?;
    let steps = linearizer.steps(graph);
    info!(total_steps = steps.len(), new_steps = added, edges = graph.edge_count(), "Generated migration steps");
    Ok(steps)
}
