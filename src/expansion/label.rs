//! Per-expansion bookkeeping for enqueued edges.

use crate::graph::{GraphId, NodeId};

/// Traversal record for one edge during one expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLabel {
    /// The labelled edge.
    pub edge_id: GraphId,
    /// Node the expansion continues from once this edge is settled: the end
    /// node when expanding forward, the start node when expanding in reverse.
    pub node: NodeId,
    /// Accumulated cost from the origin, including this edge.
    pub cost: f32,
    /// Queue ordering key.
    pub sort_cost: f32,
    /// Set once the label has been expanded.
    pub settled: bool,
    /// True for the label the expansion was seeded with.
    pub origin: bool,
}

impl EdgeLabel {
    pub fn origin(edge_id: GraphId, node: NodeId, cost: f32) -> Self {
        Self {
            edge_id,
            node,
            cost,
            sort_cost: cost,
            settled: false,
            origin: true,
        }
    }

    pub fn successor(edge_id: GraphId, node: NodeId, cost: f32) -> Self {
        Self {
            edge_id,
            node,
            cost,
            sort_cost: cost,
            settled: false,
            origin: false,
        }
    }

    /// Lower the cost of reaching this edge.
    pub fn update(&mut self, cost: f32) {
        self.cost = cost;
        self.sort_cost = cost;
    }
}
