//! In-memory road graph.
//!
//! Uses petgraph to store the directed road network and implements
//! [`GraphReader`] over it, so reach can be computed without a tile store.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::reader::GraphReader;
use super::types::*;
use crate::error::{ReachError, Result};

/// The road graph: nodes are junctions, edges are one-way road segments.
pub struct RoadGraph {
    /// The directed graph storing the network.
    graph: DiGraph<NodeData, EdgeData>,
    /// Index: node name -> node id (named nodes only).
    name_index: HashMap<String, NodeId>,
}

impl RoadGraph {
    /// Create a new empty road graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_index: HashMap::new(),
        }
    }

    /// Access the underlying petgraph (for serialization).
    pub(crate) fn inner_graph(&self) -> &DiGraph<NodeData, EdgeData> {
        &self.graph
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Add an unnamed node. Returns its id.
    pub fn add_node(&mut self) -> NodeId {
        self.add_node_data(NodeData::default())
    }

    /// Add a named node, or return the existing node with that name.
    pub fn add_named_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        self.add_node_data(NodeData {
            name: name.to_string(),
        })
    }

    pub(crate) fn add_node_data(&mut self, data: NodeData) -> NodeId {
        let name = data.name.clone();
        let idx = self.graph.add_node(data);
        let id = NodeId(idx.index() as u32);
        if !name.is_empty() {
            self.name_index.insert(name, id);
        }
        id
    }

    /// Look up a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Add a one-way edge. Returns its id.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, data: EdgeData) -> Result<GraphId> {
        let from_idx = self.node_index(from)?;
        let to_idx = self.node_index(to)?;
        let idx = self.graph.add_edge(from_idx, to_idx, data);
        Ok(GraphId(idx.index() as u64))
    }

    /// Add a two-way segment as a pair of opposing edges.
    ///
    /// Returns `(forward, reverse)` where forward runs `from -> to`.
    pub fn add_two_way(
        &mut self,
        from: NodeId,
        to: NodeId,
        data: EdgeData,
    ) -> Result<(GraphId, GraphId)> {
        let forward = self.add_edge(from, to, data.clone())?;
        let reverse = self.add_edge(to, from, data)?;
        self.link_opposing(forward, reverse)?;
        Ok((forward, reverse))
    }

    /// Mark two edges as each other's opposing edge.
    pub fn link_opposing(&mut self, a: GraphId, b: GraphId) -> Result<()> {
        self.edge_data_mut(a)?.opposing = Some(b);
        self.edge_data_mut(b)?.opposing = Some(a);
        Ok(())
    }

    /// Prohibit the turn `from -> onto`.
    pub fn restrict_turn(&mut self, from: GraphId, onto: GraphId) -> Result<()> {
        let data = self.edge_data_mut(from)?;
        if !data.no_turn_onto.contains(&onto) {
            data.no_turn_onto.push(onto);
        }
        Ok(())
    }

    /// Mutable access to an edge's attributes.
    pub fn edge_data_mut(&mut self, id: GraphId) -> Result<&mut EdgeData> {
        self.graph
            .edge_weight_mut(EdgeIndex::new(id.0 as usize))
            .ok_or(ReachError::EdgeNotFound(id))
    }

    /// All edge ids in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = GraphId> + '_ {
        self.graph.edge_indices().map(|idx| GraphId(idx.index() as u64))
    }

    // ─── Stats ──────────────────────────────────────────────────

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..GraphStats::default()
        };
        for edge in self.graph.edge_weights() {
            if edge.opposing.is_some() {
                stats.two_way_edges += 1;
            }
            if edge.closed {
                stats.closed_edges += 1;
            }
            if edge.conditional.is_some() {
                stats.conditional_edges += 1;
            }
            stats.turn_restrictions += edge.no_turn_onto.len();
        }
        stats
    }

    // ─── Internal ───────────────────────────────────────────────

    fn node_index(&self, id: NodeId) -> Result<NodeIndex> {
        let idx = NodeIndex::new(id.0 as usize);
        if self.graph.node_weight(idx).is_none() {
            return Err(ReachError::NodeNotFound(id));
        }
        Ok(idx)
    }

    fn edges_at(&self, node: NodeId, dir: Direction) -> Result<Vec<GraphId>> {
        let idx = self.node_index(node)?;
        let mut ids: Vec<GraphId> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| GraphId(e.id().index() as u64))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl GraphReader for RoadGraph {
    fn edge(&self, id: GraphId) -> Result<DirectedEdge> {
        let idx = EdgeIndex::new(id.0 as usize);
        let (from, to) = self
            .graph
            .edge_endpoints(idx)
            .ok_or(ReachError::EdgeNotFound(id))?;
        let data = &self.graph[idx];
        Ok(DirectedEdge::from_parts(
            id,
            NodeId(from.index() as u32),
            NodeId(to.index() as u32),
            data,
        ))
    }

    fn outgoing(&self, node: NodeId) -> Result<Vec<GraphId>> {
        self.edges_at(node, Direction::Outgoing)
    }

    fn incoming(&self, node: NodeId) -> Result<Vec<GraphId>> {
        self.edges_at(node, Direction::Incoming)
    }
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the road graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub two_way_edges: usize,
    pub closed_edges: usize,
    pub conditional_edges: usize,
    pub turn_restrictions: usize,
}

/// Build a graph from node and edge lists, e.g. after decoding a snapshot.
pub(crate) fn assemble(
    nodes: Vec<NodeData>,
    edges: Vec<(NodeId, NodeId, EdgeData)>,
) -> Result<RoadGraph> {
    let mut graph = RoadGraph::new();
    for node in nodes {
        graph.add_node_data(node);
    }
    for (from, to, data) in edges {
        graph.add_edge(from, to, data)?;
    }
    debug!(
        nodes = graph.graph.node_count(),
        edges = graph.graph.edge_count(),
        "road graph assembled"
    );
    Ok(graph)
}
